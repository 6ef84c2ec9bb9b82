//! イベント配信（通知）の実装
//!
//! - `websocket`: 接続ごとの `UnboundedSender` を使った実装

pub mod websocket;

pub use websocket::WebSocketEventDispatcher;
