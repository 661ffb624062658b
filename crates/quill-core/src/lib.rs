//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the ownership rule, pagination, upload validation and the ports
//! that infrastructure must implement.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
