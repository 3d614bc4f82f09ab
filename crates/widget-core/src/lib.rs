//! Headless core of the embeddable chat widget.
//!
//! The controller owns the open/closed lifecycle, transcript, pending input and
//! scripted replies; the bootstrap keeps the guarded widget unique per host.
//! Rendering is left to whichever presentation layer subscribes to snapshots.
#![deny(unsafe_code)]

/// Layered widget configuration and the settings store.
pub mod config;
/// Open/closed lifecycle, transcript and reply scheduling.
pub mod controller;
/// Configuration errors.
pub mod error;
/// Notifications and snapshots published by the controller.
pub mod events;
/// Literal strings host harnesses rely on to find the widget's controls.
pub mod labels;
/// Messages and the append-only conversation log.
pub mod message;
/// Attachment points, the mount registry and the bootstrap.
pub mod mount;
/// Injectable clocks and the one-shot reply queue.
pub mod timer;

pub use config::{AutoMount, PresentationMode, WidgetConfig, WidgetSettingsStore};
pub use controller::{COMMIT_KEY, ControllerPolicy, WidgetController};
pub use error::{ConfigError, ConfigResult};
pub use events::{Visibility, WidgetEvent, WidgetSnapshot};
pub use message::{Author, ConversationLog, Message};
pub use mount::{AttachmentPoint, Bootstrap, MountOutcome, MountRegistry, MountedWidget};
pub use timer::{Clock, ManualClock, ReplyTimerId, ScheduledReply, SystemClock};
