//! Confluence REST API payload types.

mod attachment;
mod error;
mod page;

pub use attachment::{Attachment, AttachmentsResponse};
pub use error::ErrorResponse;
pub use page::{Body, Links, Page, PagesResponse, Storage, Version};
