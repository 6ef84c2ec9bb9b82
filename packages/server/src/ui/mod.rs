//! Axum server: WebSocket endpoint and the room CRUD HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, build_router};
