//! Channels: places a conversation can be driven from besides the widget.

pub mod cli;

use std::pin::Pin;

use futures::Stream;

pub use cli::CliChannel;

/// Lines of user input, already trimmed.
pub type InputStream = Pin<Box<dyn Stream<Item = String> + Send>>;
