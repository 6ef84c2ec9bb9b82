//! 接続時の認証情報（credential）検証の実装

pub mod jwt;

pub use jwt::JwtCredentialVerifier;
