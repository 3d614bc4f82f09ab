//! GPUI presentation of the embeddable chat widget.
//!
//! The host shell owns the bootstrap and renders every mounted widget on top of
//! its own content. All interaction state lives in `chat-widget-core`.
#![deny(unsafe_code)]

/// Host window, global mount action and key bindings.
pub mod app;
/// Launcher, conversation panel and composer views.
pub mod widget;
