//! Bot command layer.
//!
//! This module provides:
//! - Command recognition ([`Command`], [`CommandKind`])
//! - Reply texts ([`replies`])
//! - Command semantics against the registry and rate source ([`CommandHandler`])
//! - The long-polling update loop ([`UpdatePoller`])

mod command;
mod handler;
mod poller;
pub mod replies;


pub use command::{Command, CommandKind};
pub use handler::CommandHandler;
pub use poller::UpdatePoller;
