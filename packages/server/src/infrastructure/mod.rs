//! Infrastructure layer: concrete implementations of the domain seams.

pub mod auth;
pub mod dispatcher;
pub mod dto;
pub mod repository;
