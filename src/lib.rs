//! ConvoPro - chat with locally hosted LLMs and keep every conversation.

pub mod ai;
pub mod config;
pub mod session;
pub mod store;
pub mod types;

#[cfg(feature = "ui")]
pub mod ui;
#[cfg(feature = "ui")]
pub mod views;
