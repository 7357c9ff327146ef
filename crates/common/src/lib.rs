//! Common utilities and shared types for warden.
//!
//! This crate provides foundational components used across all warden crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Duration parsing**: Staff-entered duration tokens via [`parse_duration`]
//! - **Subject keys**: Punishment subject identity via [`SubjectKey`]
//!
//! # Example
//!
//! ```
//! use warden_common::{parse_duration, SubjectKey};
//!
//! let duration = parse_duration("7d");
//! assert!(duration.is_some());
//!
//! let subject = SubjectKey::from_account_id("a1b2c3");
//! assert!(!subject.is_empty());
//! ```

pub mod config;
pub mod duration;
pub mod error;
pub mod subject;

pub use config::{Config, ModerationConfig};
pub use duration::{format_duration, format_remaining_at, parse_duration};
pub use error::{AppError, AppResult};
pub use subject::SubjectKey;
