pub const OPEN_CHAT: &str = "Open chat assistant";
pub const CLOSE_CHAT: &str = "Close chat";
pub const SEND_MESSAGE: &str = "Send message";
pub const TITLE: &str = "Chat Assistant";
pub const INPUT_PLACEHOLDER: &str = "Type your message...";
