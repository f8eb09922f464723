//! Client for the Kling AI video and audio generation API.
//!
//! Generation is asynchronous on the server: a request creates a task, and
//! the task is polled until it succeeds or fails. This crate provides typed
//! requests for every generation family and a completion waiter that works
//! both with async code ([`KlingClient`]) and with plain threads
//! ([`blocking::KlingClient`]).
//!
//! # Examples
//!
//! ## Create a video and wait for it
//!
//! ```no_run
//! use kling::KlingClient;
//! use kling::models::TextToVideoRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads KLING_ACCESS_KEY / KLING_SECRET_KEY (and .env)
//!     let client = KlingClient::from_env()?;
//!
//!     let request = TextToVideoRequest::new("a red panda sliding down a snowy hill");
//!     let task = client.text_to_video().create_and_wait(&request).await?;
//!
//!     for video in task.result().map(|r| r.videos.as_slice()).unwrap_or_default() {
//!         println!("Video ready: {}", video.url);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Waiting on an existing task from a thread
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use kling::WaitOptions;
//! use kling::blocking::KlingClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KlingClient::from_env()?;
//!     let options = WaitOptions::new(Duration::from_secs(3), Some(Duration::from_secs(900)))?;
//!
//!     let task = client.video_effects().wait_for_completion("task-id", &options)?;
//!     println!("{} finished as {}", task.id(), task.status());
//!
//!     Ok(())
//! }
//! ```

pub mod accessor;
pub mod auth;
pub mod blocking;
mod calls;
pub mod client;
pub mod config;
pub mod family;
pub mod transport;
pub mod waiter;

pub use kling_proto::{ErrorKind, KlingError, Result, Task, TaskStatus, Validate, models};

pub use accessor::{AsyncTaskAccessor, HttpTaskAccessor, StatusEndpoint, TaskAccessor};
pub use auth::Credentials;
pub use client::{Jobs, KlingClient};
pub use config::{KlingConfig, PollSettings};
pub use family::{Submission, TaskFamily};
pub use transport::{
    ApiRequest, ApiResponse, AsyncTransport, BlockingReqwestTransport, ReqwestTransport, Transport,
};
pub use waiter::{PollLoop, PollStep, WaitOptions, wait, wait_blocking};
