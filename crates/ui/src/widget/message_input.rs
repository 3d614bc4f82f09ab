use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use chat_widget_core::labels;

/// Raw edits and key presses forwarded to the owning widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    DraftChanged(String),
    /// Unmodified key pressed inside the composer; the controller decides whether it commits.
    KeyPressed(SharedString),
    SendClicked,
}

pub struct MessageInput {
    input_state: Entity<InputState>,
    can_send: bool,
}

impl EventEmitter<ComposerEvent> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(labels::INPUT_PLACEHOLDER)
                .clean_on_escape()
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, state, event: &InputEvent, _window, cx| match event {
                // Commits are routed from the captured keystroke instead.
                InputEvent::PressEnter { .. } => {}
                _ => {
                    let draft = state.read(cx).value().to_string();
                    this.can_send = !draft.trim().is_empty();
                    cx.emit(ComposerEvent::DraftChanged(draft));
                }
            },
        )
        .detach();

        Self {
            input_state,
            can_send: false,
        }
    }

    /// Mirrors the controller's pending input back into the text field.
    pub fn set_text(&mut self, text: &str, window: &mut Window, cx: &mut Context<Self>) {
        if self.input_state.read(cx).value().to_string() == text {
            return;
        }
        self.input_state.update(cx, |state, cx| {
            state.set_value(text.to_string(), window, cx);
        });
        self.can_send = !text.trim().is_empty();
        cx.notify();
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.focus(window, cx);
        });
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .w_full()
            .gap_2()
            .p_3()
            .bg(theme.background)
            .border_t_1()
            .border_color(theme.border)
            .capture_key_down(cx.listener(|_, event: &KeyDownEvent, _window, cx| {
                if let Some(key) = pressed_key(&event.keystroke) {
                    cx.emit(ComposerEvent::KeyPressed(key));
                }
            }))
            .child(div().flex_1().min_w_0().child(Input::new(&self.input_state)))
            .child(
                Button::new("chat-send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .tooltip(labels::SEND_MESSAGE)
                    .disabled(!self.can_send)
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(ComposerEvent::SendClicked);
                    })),
            )
    }
}

/// Key name to forward, or `None` for chords carrying a modifier.
fn pressed_key(keystroke: &Keystroke) -> Option<SharedString> {
    if keystroke.modifiers.modified() {
        return None;
    }
    Some(SharedString::from(keystroke.key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_are_forwarded_by_name() {
        let enter = Keystroke::parse("enter").unwrap();
        assert_eq!(pressed_key(&enter), Some(SharedString::from("enter")));

        let letter = Keystroke::parse("a").unwrap();
        assert_eq!(pressed_key(&letter), Some(SharedString::from("a")));
    }

    #[test]
    fn modified_chords_are_not_forwarded() {
        let shift_enter = Keystroke::parse("shift-enter").unwrap();
        assert_eq!(pressed_key(&shift_enter), None);

        let cmd_enter = Keystroke::parse("cmd-enter").unwrap();
        assert_eq!(pressed_key(&cmd_enter), None);
    }
}
