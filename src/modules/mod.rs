//! Modules layer - Infrastructure components for external integrations
//!
//! Record store (PostgreSQL) and blob store (MinIO/S3) adapters.

pub mod records;
pub mod storage;
