//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod media_store;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use media_store::{MediaStore, StorageError, StoredMedia};
pub use repository::{BaseRepository, PostRepository, UserRepository};
