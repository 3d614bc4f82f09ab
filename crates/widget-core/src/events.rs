use std::time::Duration;

use crate::message::{Author, Message};
use crate::timer::ReplyTimerId;

/// Panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

impl Visibility {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

/// Notifications queued by the controller for its presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Opened,
    Closed,
    InputChanged,
    /// A message was appended at `index`.
    MessageAppended { index: usize, author: Author },
    LogCleared,
    /// The log changed length; the transcript should reveal its newest entry.
    ScrollToLatest { len: usize },
    ReplyScheduled { id: ReplyTimerId, due_in: Duration },
}

/// Point-in-time view of everything a renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSnapshot {
    pub visibility: Visibility,
    pub messages: Vec<Message>,
    pub pending_input: String,
    pub pending_replies: usize,
}

impl WidgetSnapshot {
    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    /// True when the send control should be enabled.
    pub fn can_send(&self) -> bool {
        !self.pending_input.trim().is_empty()
    }
}
