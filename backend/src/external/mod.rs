//! External collaborators

pub mod attachment_store;

pub use attachment_store::{AttachmentStore, LocalAttachmentStore, UploadedFile};
