//! Stockroom Core - Domain Types
//!
//! Pure data structures and the typed error taxonomy for the goods service.
//! This crate contains no I/O: the repository, cache, and event writer in
//! `stockroom-api` all speak in terms of these types.

pub mod error;
pub mod event;
pub mod good;

pub use error::{CacheError, EventError, RepoError};
pub use event::ChangeEvent;
pub use good::{Good, GoodPage, Meta};

use chrono::{DateTime, Utc};

/// Store-assigned row identifier for goods and projects.
pub type GoodId = i32;

/// Identifier of the parent project a good belongs to.
pub type ProjectId = i32;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
