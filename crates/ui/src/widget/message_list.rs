use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};

use chat_widget_core::{Author, Message};

use crate::widget::scroll_manager::ScrollManager;

const BUBBLE_MAX_WIDTH: Pixels = px(280.);
const BUBBLE_PADDING_X: Pixels = px(14.);
const BUBBLE_PADDING_Y: Pixels = px(8.);

/// Horizontal placement of a bubble inside the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSide {
    Start,
    End,
}

/// User messages sit on the trailing edge, widget messages on the leading one.
pub fn bubble_side(author: Author) -> BubbleSide {
    match author {
        Author::User => BubbleSide::End,
        Author::System => BubbleSide::Start,
    }
}

/// Scrollable transcript of one widget.
pub struct MessageList {
    messages: Vec<Message>,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn set_messages(&mut self, messages: Vec<Message>, cx: &mut Context<Self>) {
        // A cleared log collapses the content, which would read as scrolling up.
        if messages.is_empty() {
            self.scroll_manager.reset();
        }
        self.messages = messages;
        cx.notify();
    }

    pub fn request_scroll_to_bottom(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.request_scroll_to_bottom();
        cx.notify();
    }

    fn render_message_row(&self, message: &Message, index: usize, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let (background, foreground) = match message.author {
            Author::User => (theme.primary, theme.primary_foreground),
            Author::System => (theme.muted, theme.foreground),
        };
        let row = v_flex().id(("chat-message", index)).w_full();
        let row = match bubble_side(message.author) {
            BubbleSide::End => row.items_end(),
            BubbleSide::Start => row.items_start(),
        };

        row.child(
            div()
                .max_w(BUBBLE_MAX_WIDTH)
                .px(BUBBLE_PADDING_X)
                .py(BUBBLE_PADDING_Y)
                .rounded_lg()
                .bg(background)
                .text_color(foreground)
                .child(Label::new(message.text.clone()).text_sm()),
        )
        .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let rows = self
            .messages
            .iter()
            .enumerate()
            .map(|(index, message)| self.render_message_row(message, index, cx))
            .collect::<Vec<_>>();

        v_flex()
            .id("chat-transcript")
            .size_full()
            .min_h_0()
            .px_4()
            .py_3()
            .gap_2()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .children(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubbles_align_by_author() {
        assert_eq!(bubble_side(Author::User), BubbleSide::End);
        assert_eq!(bubble_side(Author::System), BubbleSide::Start);
    }
}
