//! Watch-room synchronization server.
//!
//! Keeps every participant of a room in lockstep with the host's playback,
//! and relays chat, reactions and gifts to the room.

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
