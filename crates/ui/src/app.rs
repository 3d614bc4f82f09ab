use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use chat_widget_core::{Bootstrap, MountOutcome, MountedWidget, WidgetConfig, WidgetEvent};

use crate::widget::ChatWidget;

gpui::actions!(chat_widget, [MountChatWidget, Quit]);

/// Route from the global mount action to the shell that owns the bootstrap.
#[derive(Clone)]
struct HostWindow {
    window: AnyWindowHandle,
    shell: WeakEntity<HostShell>,
}

impl Global for HostWindow {}

/// Registers the application-wide actions and key bindings.
pub fn init(cx: &mut App) {
    // Deferred so the mount runs outside the window update that dispatched it.
    cx.on_action(|_: &MountChatWidget, cx| cx.defer(mount_chat_widget));
    cx.on_action(|_: &Quit, cx| cx.quit());

    cx.bind_keys([
        KeyBinding::new("cmd-q", Quit, None),
        KeyBinding::new("cmd-shift-m", MountChatWidget, None),
    ]);
}

/// Zero-argument mount entry point, safe to call any number of times.
pub fn mount_chat_widget(cx: &mut App) {
    let Some(host) = cx.try_global::<HostWindow>().cloned() else {
        tracing::warn!("no host window is available to mount the chat widget into");
        return;
    };

    let result = host.window.update(cx, |_, window, cx| {
        host.shell.update(cx, |shell, cx| shell.mount(window, cx))
    });
    match result {
        Ok(Ok(())) => {}
        Ok(Err(error)) | Err(error) => {
            tracing::error!("failed to mount chat widget: {}", error);
        }
    }
}

/// Host page that carries the widgets.
///
/// Owns the [`Bootstrap`] and therefore the mount registry; every mounted or
/// always-rendered widget is drawn above the host content.
pub struct HostShell {
    bootstrap: Bootstrap,
    widgets: Vec<Entity<ChatWidget>>,
    exchanged_messages: usize,
}

impl HostShell {
    pub fn new(config: WidgetConfig, window: &mut Window, cx: &mut Context<Self>) -> Self {
        cx.set_global(HostWindow {
            window: window.window_handle(),
            shell: cx.weak_entity(),
        });

        let mut this = Self {
            bootstrap: Bootstrap::new(config),
            widgets: Vec::new(),
            exchanged_messages: 0,
        };

        for mounted in this.bootstrap.initialize() {
            this.attach(mounted, window, cx);
        }

        // The window is ready once the current update cycle settles.
        cx.defer_in(window, |this, window, cx| {
            this.document_ready(window, cx);
        });

        this
    }

    pub fn widgets(&self) -> &[Entity<ChatWidget>] {
        &self.widgets
    }

    pub fn mount(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        match self.bootstrap.mount() {
            MountOutcome::Mounted(mounted) => self.attach(mounted, window, cx),
            MountOutcome::AlreadyMounted { .. } => {}
        }
    }

    fn document_ready(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if let Some(mounted) = self.bootstrap.document_ready() {
            self.attach(mounted, window, cx);
        }
    }

    fn attach(&mut self, mounted: MountedWidget, window: &mut Window, cx: &mut Context<Self>) {
        let presentation = self.bootstrap.config().presentation;
        let attachment = mounted.attachment.id.clone();
        let widget = cx.new(|cx| ChatWidget::new(mounted, presentation, window, cx));

        cx.subscribe(&widget, |this, _, event: &WidgetEvent, cx| {
            this.handle_widget_event(event, cx);
        })
        .detach();

        tracing::info!(attachment = %attachment, "attached chat widget");
        self.widgets.push(widget);
        cx.notify();
    }

    fn handle_widget_event(&mut self, event: &WidgetEvent, cx: &mut Context<Self>) {
        tracing::trace!(?event, "chat widget event");
        if let WidgetEvent::MessageAppended { .. } = event {
            self.exchanged_messages += 1;
            cx.notify();
        }
    }
}

impl Render for HostShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let mounted = self
            .bootstrap
            .registry()
            .ids()
            .collect::<Vec<_>>()
            .join(", ");
        let mounted = if mounted.is_empty() {
            "none".to_string()
        } else {
            mounted
        };

        div()
            .id("host-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .text_color(theme.foreground)
            .child(
                v_flex()
                    .id("host-content")
                    .size_full()
                    .p_6()
                    .gap_3()
                    .child(Label::new("Host page").text_lg())
                    .child(
                        Label::new(format!("Mounted attachment points: {mounted}"))
                            .text_sm()
                            .text_color(theme.muted_foreground),
                    )
                    .child(
                        Label::new(format!("Messages exchanged: {}", self.exchanged_messages))
                            .text_sm()
                            .text_color(theme.muted_foreground),
                    )
                    .child(
                        h_flex().child(
                            Button::new("host-mount-widget")
                                .small()
                                .ghost()
                                .child("Mount chat widget")
                                .on_click(|_, window, cx| {
                                    window.dispatch_action(Box::new(MountChatWidget), cx);
                                }),
                        ),
                    ),
            )
            .children(self.widgets.iter().cloned())
    }
}
