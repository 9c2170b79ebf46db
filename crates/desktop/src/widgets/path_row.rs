use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use crate::theme::tertiary_color;

/// What a [`path_row`] currently shows.
pub enum PathLabel {
    /// Nothing chosen yet; rendered dimmed.
    Placeholder(String),
    Chosen(String),
}

/// A labelled box showing a chosen path (or placeholder) with a browse
/// button on the right. The button is inert while `on_browse` is `None`.
pub fn path_row<'a, Message: Clone + 'a>(
    label: &str,
    value: PathLabel,
    button_label: &str,
    on_browse: Option<Message>,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let (indicator, display_text) = match value {
        PathLabel::Chosen(s) => (
            text("\u{2713}").size(15).color(theme.palette().success),
            text(s).size(15),
        ),
        PathLabel::Placeholder(s) => (
            text("\u{25CB}").size(15).color(tertiary),
            text(s).size(15).color(tertiary),
        ),
    };

    let btn = button(text(button_label.to_owned()).size(13))
        .padding([6, 14])
        .on_press_maybe(on_browse)
        .style(button::secondary);

    let label_text = text(label.to_owned()).size(12).color(tertiary);

    let info = column![
        label_text,
        Space::new().height(2),
        row![indicator, display_text]
            .spacing(6)
            .align_y(iced::Alignment::Center),
    ]
    .width(Length::Fill);

    let content = row![info, btn].spacing(8).align_y(iced::Alignment::Center);

    container(content)
        .padding([14, 16])
        .style(container::rounded_box)
        .width(Length::Fill)
        .into()
}
