//! # Quill Shared
//!
//! Request and response types of the HTTP API, shared with any Rust client.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
