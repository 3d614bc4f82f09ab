use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use chat_widget_core::{
    AttachmentPoint, MountedWidget, PresentationMode, WidgetController, WidgetEvent, labels,
};

use crate::widget::message_input::{ComposerEvent, MessageInput};
use crate::widget::message_list::MessageList;

const LAUNCHER_SIZE: Pixels = px(60.);
const LAUNCHER_INSET: Pixels = px(20.);
const PANEL_WIDTH: Pixels = px(400.);
const PANEL_HEIGHT: Pixels = px(400.);
const POPOVER_GAP: Pixels = px(12.);

/// Launcher plus conversation panel for one mounted controller.
pub struct ChatWidget {
    attachment: AttachmentPoint,
    presentation: PresentationMode,
    controller: WidgetController,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    /// Focus held before the modal opened, handed back on close.
    restore_focus: Option<FocusHandle>,
}

impl EventEmitter<WidgetEvent> for ChatWidget {}

impl ChatWidget {
    pub fn new(
        mounted: MountedWidget,
        presentation: PresentationMode,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &ComposerEvent, window, cx| {
                this.handle_composer_event(event, window, cx);
            },
        )
        .detach();

        Self {
            attachment: mounted.attachment,
            presentation,
            controller: mounted.controller,
            message_list,
            message_input,
            restore_focus: None,
        }
    }

    pub fn attachment(&self) -> &AttachmentPoint {
        &self.attachment
    }

    pub fn controller(&self) -> &WidgetController {
        &self.controller
    }

    pub fn open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.controller.is_open() {
            return;
        }
        if self.presentation.restores_focus() {
            self.restore_focus = window.focused(cx);
        }
        self.controller.open();
        self.message_input.update(cx, |input, cx| input.focus(window, cx));
        self.flush_events(Some(window), cx);
    }

    pub fn close(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.controller.is_open() {
            return;
        }
        self.controller.close();
        if let Some(previous) = self.restore_focus.take() {
            window.focus(&previous, cx);
        }
        self.flush_events(Some(window), cx);
    }

    fn toggle(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.controller.is_open() {
            self.close(window, cx);
        } else {
            self.open(window, cx);
        }
    }

    fn handle_composer_event(
        &mut self,
        event: &ComposerEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match event {
            ComposerEvent::DraftChanged(text) => self.controller.update_input(text.clone()),
            ComposerEvent::KeyPressed(key) => {
                self.controller.on_key_commit(key);
            }
            ComposerEvent::SendClicked => {
                self.controller.send();
            }
        }
        self.flush_events(Some(window), cx);
    }

    fn fire_due_replies(&mut self, cx: &mut Context<Self>) {
        if self.controller.fire_due_replies() > 0 {
            self.flush_events(None, cx);
            return;
        }

        // Woke before the deadline on the controller's clock.
        if let Some(remaining) = self.controller.next_reply_due_in() {
            self.schedule_reply_wakeup(remaining, cx);
        }
    }

    fn schedule_reply_wakeup(&mut self, delay: Duration, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;

            let _ = this.update(cx, |this, cx| {
                this.fire_due_replies(cx);
            });
        })
        .detach();
    }

    /// Routes queued controller events to the child views and the host.
    fn flush_events(&mut self, mut window: Option<&mut Window>, cx: &mut Context<Self>) {
        let events = self.controller.drain_events();
        if events.is_empty() {
            return;
        }

        let mut log_changed = false;
        for event in &events {
            match event {
                WidgetEvent::MessageAppended { .. } | WidgetEvent::LogCleared => {
                    log_changed = true;
                }
                WidgetEvent::ScrollToLatest { .. } => {
                    self.message_list
                        .update(cx, |list, cx| list.request_scroll_to_bottom(cx));
                }
                WidgetEvent::InputChanged => {
                    if let Some(window) = window.as_deref_mut() {
                        let text = self.controller.pending_input().to_string();
                        self.message_input
                            .update(cx, |input, cx| input.set_text(&text, window, cx));
                    }
                }
                WidgetEvent::ReplyScheduled { due_in, .. } => {
                    self.schedule_reply_wakeup(*due_in, cx);
                }
                WidgetEvent::Opened | WidgetEvent::Closed => {}
            }
        }

        if log_changed {
            let messages = self.controller.messages().to_vec();
            self.message_list
                .update(cx, |list, cx| list.set_messages(messages, cx));
        }

        for event in events {
            cx.emit(event);
        }
        cx.notify();
    }
}

impl Render for ChatWidget {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let is_open = self.controller.is_open();
        let presentation = self.presentation;

        div()
            .id(SharedString::from(self.attachment.id.clone()))
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .when(is_open && presentation == PresentationMode::Modal, |el| {
                el.child(self.render_modal(cx))
            })
            .when(is_open && presentation == PresentationMode::Popover, |el| {
                el.child(self.render_popover(cx))
            })
            .child(self.render_launcher(cx))
    }
}

impl ChatWidget {
    fn render_launcher(&self, cx: &Context<Self>) -> impl IntoElement {
        let icon = if self.controller.is_open() {
            IconName::Close
        } else {
            IconName::Chat
        };

        div()
            .absolute()
            .bottom(LAUNCHER_INSET)
            .right(LAUNCHER_INSET)
            .size(LAUNCHER_SIZE)
            .flex()
            .items_center()
            .justify_center()
            .rounded_full()
            .overflow_hidden()
            .child(
                Button::new("chat-launcher")
                    .primary()
                    .large()
                    .icon(icon)
                    .tooltip(labels::OPEN_CHAT)
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.toggle(window, cx);
                    })),
            )
    }

    /// Centered panel over a backdrop; clicking the backdrop or pressing escape closes it.
    fn render_modal(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("chat-modal-backdrop")
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .flex()
            .items_center()
            .justify_center()
            .bg(theme.overlay)
            .occlude()
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, window, cx| {
                    this.close(window, cx);
                }),
            )
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                if event.keystroke.key == "escape" {
                    this.close(window, cx);
                }
            }))
            .child(self.render_panel(cx))
    }

    fn render_popover(&self, cx: &Context<Self>) -> impl IntoElement {
        div()
            .absolute()
            .bottom(LAUNCHER_INSET + LAUNCHER_SIZE + POPOVER_GAP)
            .right(LAUNCHER_INSET)
            .child(self.render_panel(cx))
    }

    fn render_panel(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-window")
            .w(PANEL_WIDTH)
            .h(PANEL_HEIGHT)
            .overflow_hidden()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .shadow_lg()
            .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
            .child(
                h_flex()
                    .id("chat-header")
                    .w_full()
                    .flex_shrink_0()
                    .justify_between()
                    .items_center()
                    .p_4()
                    .bg(theme.primary)
                    .text_color(theme.primary_foreground)
                    .child(Label::new(labels::TITLE))
                    .child(
                        Button::new("chat-close")
                            .ghost()
                            .small()
                            .icon(IconName::Close)
                            .tooltip(labels::CLOSE_CHAT)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.close(window, cx);
                            })),
                    ),
            )
            .child(
                div()
                    .id("chat-messages")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-input")
                    .flex_shrink_0()
                    .w_full()
                    .child(self.message_input.clone()),
            )
    }
}
