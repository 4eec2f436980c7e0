//! Core business logic module

pub mod access_point;
pub mod auth_request;
pub mod error;
pub mod interface;
pub mod manager;
pub mod types;
