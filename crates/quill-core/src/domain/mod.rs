//! Domain entities - the core business objects.

mod media;
mod page;
mod post;
mod user;

pub use media::{MAX_UPLOAD_BYTES, MediaType, SNIFF_LEN, UploadedImage, sniff};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, PageRequest};
pub use post::{Post, PostDraft, PostWithAuthor, subject_owns};
pub use user::{NewUser, User};
