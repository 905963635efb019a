//! Attachment slots: upload validation, blob staging and file delivery.

pub mod dtos;
pub mod services;

pub use services::AttachmentService;
