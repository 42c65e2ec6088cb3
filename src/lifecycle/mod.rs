//! Process lifecycle: shutdown signal handling

pub mod shutdown;
