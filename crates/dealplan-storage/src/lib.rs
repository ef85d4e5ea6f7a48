//! Dealplan Storage Library
//!
//! Storage abstraction plus the S3 and local filesystem backends.
//!
//! # Object layout
//!
//! Objects are addressed by a logical bucket and a key:
//!
//! - `inputs-files/{opportunity_id}/inputs/{sanitized_file_name}`
//! - `artifacts-files/opportunities/{opportunity_id}/dsp-v{version}.{ext}`
//!
//! Keys must not contain `..` segments or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

pub use dealplan_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{ARTIFACTS_BUCKET, INPUTS_BUCKET};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::{SignatureError, UrlSigner};
pub use traits::{Storage, StorageError, StorageResult};
