//! HTTP API over the resolver
//!
//! - `GET /health` - liveness plus resolution counters
//! - `GET /resource?url=..&fields=meta,images&refresh=false` - resolve a URL

mod context;
mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;
pub(crate) mod utils;

pub use context::RequestContext;
pub use error::ApiError;
pub use server::{router, run};
