//! HTML digest rendering and email dispatch.

mod email;
mod render;

pub use email::{EmailSender, DIGEST_SUBJECT};
pub use render::{DigestRecord, DigestRenderer};
