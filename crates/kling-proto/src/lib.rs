//! # kling-proto
//!
//! Shared wire types and error definitions for the Kling AI SDK.
//!
//! This crate has no transport dependency and provides:
//! - The response envelope decoder
//! - The normalized task record and status vocabulary
//! - The SDK error taxonomy
//! - Request and result records for every job family

pub mod envelope;
pub mod error;
pub mod models;
pub mod status;
pub mod task;

pub use envelope::Envelope;
pub use error::{BoxError, ErrorKind, KlingError, Result};
pub use models::Validate;
pub use status::TaskStatus;
pub use task::{Task, TaskData};
