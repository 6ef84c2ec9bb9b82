//! Data Transfer Objects (DTOs) for the watchroom server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event frames
//! - `http`: HTTP API request/response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
