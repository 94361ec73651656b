//! Lazily-populated, cache-backed resources
//!
//! ## Key Components
//!
//! - [`Resolver`] - Builds a [`Resource`] for a URL
//! - [`Resource`] - Classified URL exposing per-field `get`/`get_all`
//! - [`ClassificationRecord`] - Value of the `basic` field
//! - [`ResourceIdentity`] - URL, cache key and expiry of one instance
//!
//! Field lookups go through three tiers: the instance's field cache, the
//! persistent [`CacheStore`](crate::cache::CacheStore), then the handler.
//! A handler that does not support a field yields `Ok(None)`.

mod entity;
mod error;
mod identity;
mod record;
mod resolver;

pub use entity::Resource;
pub use error::{ResourceError, Result};
pub use identity::ResourceIdentity;
pub use record::{BasicInfo, ClassificationRecord};
pub use resolver::Resolver;
