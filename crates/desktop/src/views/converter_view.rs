use iced::widget::{
    button, checkbox, column, container, pick_list, progress_bar, row, scrollable, slider, text,
    Space,
};
use iced::{Element, Length, Theme};

use vidconvert_core::shared::constants::{
    GIF_FPS_MAX, GIF_FPS_MIN, GIF_MAX_WIDTH_MAX, GIF_MAX_WIDTH_MIN, GIF_SCALE_MAX, GIF_SCALE_MIN,
};
use vidconvert_core::shared::target_format::TargetFormat;

use crate::app::{App, GifForm, Message};
use crate::paths;
use crate::theme::{level_color, tertiary_color};
use crate::widgets::path_row::{path_row, PathLabel};

pub fn view<'a>(app: &'a App, theme: &Theme) -> Element<'a, Message> {
    let running = app.is_running();
    let tertiary = tertiary_color(theme);

    let header = row![
        column![
            text("Video Converter").size(22).font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..iced::Font::DEFAULT
            }),
            text("Convert videos between formats or create high-quality GIFs")
                .size(13)
                .color(tertiary),
        ]
        .width(Length::Fill),
        button(text("\u{21BB}").size(16))
            .on_press(Message::Reset)
            .padding([6, 12])
            .style(button::text),
    ]
    .align_y(iced::Alignment::Center);

    let mut col = column![
        header,
        Space::new().height(16),
        path_row(
            "1. SELECT VIDEOS",
            files_label(app.selected_files.len()),
            "Browse Files",
            (!running).then_some(Message::SelectFiles),
            theme,
        ),
        Space::new().height(12),
        format_row(app.format),
        Space::new().height(12),
        path_row(
            "3. OUTPUT FOLDER",
            output_label(app),
            "Browse Folder",
            (!running).then_some(Message::SelectOutputFolder),
            theme,
        ),
    ];

    if app.format.is_gif() {
        col = col
            .push(Space::new().height(12))
            .push(gif_panel(&app.gif, theme));
    }

    col = col
        .push(Space::new().height(20))
        .push(action_row(app))
        .push(Space::new().height(12));

    if running || !app.progress_label.is_empty() {
        col = col.push(
            column![
                progress_bar(0.0..=100.0, app.progress),
                text(app.progress_label.clone()).size(13).color(tertiary),
            ]
            .spacing(6),
        );
    }

    col = col.push(Space::new().height(12)).push(status_log(app, theme));

    container(scrollable(col.padding(20)).height(Length::Fill))
        .height(Length::Fill)
        .into()
}

fn files_label(count: usize) -> PathLabel {
    match count {
        0 => PathLabel::Placeholder("No files selected".to_string()),
        1 => PathLabel::Chosen("1 file selected".to_string()),
        n => PathLabel::Chosen(format!("{n} files selected")),
    }
}

fn output_label(app: &App) -> PathLabel {
    match &app.output_dir {
        Some(dir) => PathLabel::Chosen(paths::display_path(dir, dirs::home_dir().as_deref())),
        None => PathLabel::Placeholder("Same as source of video(s)".to_string()),
    }
}

fn format_row<'a>(format: TargetFormat) -> Element<'a, Message> {
    container(
        row![
            text("2. CHOOSE FORMAT").size(12).width(Length::Fill),
            pick_list(TargetFormat::ALL, Some(format), Message::FormatChanged).width(140),
        ]
        .align_y(iced::Alignment::Center),
    )
    .padding([14, 16])
    .style(container::rounded_box)
    .width(Length::Fill)
    .into()
}

fn gif_panel<'a>(gif: &GifForm, theme: &Theme) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);
    let scale_min = (GIF_SCALE_MIN * 100.0).round() as u32;
    let scale_max = (GIF_SCALE_MAX * 100.0).round() as u32;

    let max_width_control: Element<'a, Message> = if gif.full_width {
        text("Source width").size(13).color(tertiary).into()
    } else {
        slider(
            GIF_MAX_WIDTH_MIN..=GIF_MAX_WIDTH_MAX,
            gif.max_width,
            Message::MaxWidthChanged,
        )
        .step(50u32)
        .into()
    };

    let content = column![
        text("GIF Quality Settings").size(14),
        labelled(
            "Frame Rate (FPS):",
            gif.fps.to_string(),
            slider(GIF_FPS_MIN..=GIF_FPS_MAX, gif.fps, Message::FpsChanged).into(),
        ),
        labelled(
            "Resolution:",
            format!("{}%", gif.scale_percent),
            slider(scale_min..=scale_max, gif.scale_percent, Message::ScalePercentChanged)
                .step(5u32)
                .into(),
        ),
        text("\u{1F4A1} Higher FPS and resolution = better quality but larger file size")
            .size(12)
            .color(tertiary),
        labelled(
            "Max Width:",
            if gif.full_width {
                "full".to_string()
            } else {
                format!("{} px", gif.max_width)
            },
            max_width_control,
        ),
        checkbox(gif.full_width)
            .label("Convert at full width")
            .on_toggle(Message::FullWidthToggled),
    ]
    .spacing(10);

    container(content)
        .padding([14, 16])
        .style(container::rounded_box)
        .width(Length::Fill)
        .into()
}

fn labelled<'a>(
    label: &str,
    value: String,
    control: Element<'a, Message>,
) -> Element<'a, Message> {
    row![
        text(label.to_owned()).size(13).width(130),
        container(control).width(Length::Fill),
        text(value).size(13).width(60),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center)
    .into()
}

fn action_row(app: &App) -> Element<'_, Message> {
    let convert = button(text(app.convert_label()).size(15))
        .on_press_maybe((!app.is_running()).then_some(Message::Convert))
        .padding([14, 24])
        .width(Length::Fill);

    let mut actions = row![convert].spacing(10);

    if app.is_running() {
        actions = actions.push(
            button(text("Cancel").size(13))
                .on_press_maybe((!app.cancel_requested).then_some(Message::Cancel))
                .padding([14, 20])
                .style(button::secondary),
        );
    } else if app.finished_folder.is_some() {
        actions = actions.push(
            button(text("Show in Folder").size(13))
                .on_press(Message::ShowOutputFolder)
                .padding([14, 20])
                .style(button::secondary),
        );
    }

    actions.into()
}

fn status_log<'a>(app: &'a App, theme: &Theme) -> Element<'a, Message> {
    let lines = column(app.status_log.iter().map(|line| {
        text(line.message.as_str())
            .size(13)
            .color(level_color(theme, line.level))
            .into()
    }))
    .spacing(4)
    .width(Length::Fill);

    column![
        text("Conversion Status").size(14),
        container(scrollable(lines).anchor_bottom().height(180))
            .padding(10)
            .style(container::rounded_box)
            .width(Length::Fill),
    ]
    .spacing(6)
    .into()
}
