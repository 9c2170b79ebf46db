mod app;
mod paths;
mod theme;
mod views;
mod widgets;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Video Converter")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(640.0, 820.0),
            min_size: Some(iced::Size::new(520.0, 600.0)),
            ..Default::default()
        })
        .run()
}
