use serde::{Deserialize, Serialize};

/// Default greeting seeded into an empty conversation on open.
pub const DEFAULT_GREETING: &str = "Hello! How can I assist you today?";
/// Default acknowledgement appended by every reply timer.
pub const DEFAULT_ACKNOWLEDGEMENT: &str = "Thank you for your message. How else can I help you?";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    System,
}

/// Core immutable message model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub author: Author,
}

impl Message {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author,
        }
    }

    /// Creates a message typed by the human operator.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text)
    }

    /// Creates a message produced by the widget itself.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Author::System, text)
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Append-only, insertion-ordered transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its display index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
