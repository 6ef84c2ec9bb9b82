//! Request handlers.

mod auth;
mod http;
mod websocket;

pub use http::{close_room, create_room, enter_room, get_room_state, health_check, my_rooms};
pub use websocket::websocket_handler;
