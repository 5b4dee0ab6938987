//! Notification service library.
//!
//! Consumes both order topics independently and pushes rendered chat
//! messages to every registered subscriber. Chats register themselves
//! by sending the `/start` command to the bot.

pub mod bot;
pub mod client;
pub mod config;
pub mod consumers;
pub mod registry;
pub mod render;
pub mod service;
