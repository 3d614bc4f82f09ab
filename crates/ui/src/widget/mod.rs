pub mod message_input;
pub mod message_list;
pub mod scroll_manager;
/// Launcher button and panel bound to one controller.
pub mod view;

pub use message_input::{ComposerEvent, MessageInput};
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use view::ChatWidget;
