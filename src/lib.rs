//! post-digest — collects forwarded posts from a chat group and sends a
//! daily AI-assisted digest to a report channel.

pub mod bot;
pub mod channels;
pub mod config;
pub mod digest;
pub mod error;
pub mod llm;
