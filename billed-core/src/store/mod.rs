//! Remote store capability used by the page components.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attachment::UploadedFile;
use crate::bill::Bill;
use crate::error::StoreError;

/// Multipart payload for the attachment upload: the file plus its owner
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentUpload {
    pub file: UploadedFile,
    pub email: String,
}

/// Store acknowledgement of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub file_url: String,
    /// Provisional bill id, used as the selector of the follow-up update
    pub key: String,
}

/// Trait for bill stores
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Upload an attachment; the store creates a provisional bill for it
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError>;

    /// Replace the bill selected by `selector` with the complete record.
    /// Without a selector the store files the record under a key of its own.
    async fn update(&self, selector: Option<&str>, bill: &Bill) -> Result<Bill, StoreError>;

    /// List the bills visible to the current user
    async fn list(&self) -> Result<Vec<Bill>, StoreError>;
}
