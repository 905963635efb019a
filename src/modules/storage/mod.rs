//! Blob storage for attachment bytes
//!
//! [`BlobStore`] is the seam; [`MinIOClient`] is the production backend.

mod blob_store;
mod minio_client;

#[cfg(test)]
pub use blob_store::memory::MemoryBlobStore;
pub use blob_store::BlobStore;
pub use minio_client::MinIOClient;
