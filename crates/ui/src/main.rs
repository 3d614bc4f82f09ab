use gpui::*;
use gpui_component::Root;

use chat_widget::app::{self, HostShell};
use chat_widget_core::WidgetSettingsStore;

/// Application entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. gpui-component initialization (required for Root and themes)
/// 3. Widget configuration from the user config dir and `CHAT_WIDGET_*` env vars
/// 4. Global mount/quit actions
/// 5. Window creation with the host shell wrapped in Root
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_component::init(cx);
        app::init(cx);

        let settings = WidgetSettingsStore::load();
        let config = settings.config();
        tracing::info!(
            path = ?settings.config_path(),
            presentation = ?config.presentation,
            clear_on_close = config.clear_on_close,
            "loaded chat widget config"
        );

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1024.), px(720.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Chat Widget Host".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let config = (*config).clone();
                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| HostShell::new(config, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });
                if let Err(error) = opened {
                    tracing::error!("failed to open host window: {}", error);
                    cx.quit();
                    return;
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
