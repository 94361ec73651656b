//! Content-type handlers
//!
//! A resource is classified into exactly one [`ResourceKind`] by the
//! [`ResourceTypeRegistry`]; the matching [`Handler`] variant owns the table of
//! fields it can compute.
//!
//! ## Key Components
//!
//! - [`Handler`] - Closed set of handler variants
//! - [`ResourceTypeRegistry`] - Priority-ordered classification
//! - [`FieldKind`] - Typed field resolved from a field name
//! - [`ComputeInput`] - Data a handler reads when computing a field
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkcache::handlers::{Handler, ResourceTypeRegistry};
//!
//! let registry = ResourceTypeRegistry::with_defaults();
//! let kind = registry.classify(url, "text/html", body);
//! let mut handler = Handler::new(kind);
//! let field = handler.field("meta").expect("html handles meta");
//! let meta = handler.compute(field, &input)?;
//! ```

mod html;
mod media;
mod registry;
mod types;

use serde_json::Value;
use thiserror::Error;

pub use html::HtmlHandler;
pub use media::MediaHandler;
pub use registry::{Predicate, ResourceTypeRegistry, clean_body};
pub use types::{ComputeInput, FieldKind, Meta, ResourceKind};

pub mod matchers {
    //! Built-in `applies` predicates, for assembling custom registries
    pub use super::html::applies as html;
    pub use super::media::{applies_audio as audio, applies_image as image, applies_video as video};
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("field '{0}' is not computed by the handler")]
    NotComputedByHandler(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Handler variant for one classified resource
#[derive(Debug, Clone)]
pub enum Handler {
    Html(HtmlHandler),
    Image(MediaHandler),
    Audio(MediaHandler),
    Video(MediaHandler),
    Generic(MediaHandler),
}

impl Handler {
    pub fn new(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Html => Handler::Html(HtmlHandler::new()),
            ResourceKind::Image => Handler::Image(MediaHandler::new(kind)),
            ResourceKind::Audio => Handler::Audio(MediaHandler::new(kind)),
            ResourceKind::Video => Handler::Video(MediaHandler::new(kind)),
            ResourceKind::Generic => Handler::Generic(MediaHandler::new(kind)),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Handler::Html(_) => ResourceKind::Html,
            Handler::Image(_) => ResourceKind::Image,
            Handler::Audio(_) => ResourceKind::Audio,
            Handler::Video(_) => ResourceKind::Video,
            Handler::Generic(_) => ResourceKind::Generic,
        }
    }

    /// Resolve a field name; `None` means the variant does not support it
    pub fn field(&self, name: &str) -> Option<FieldKind> {
        match self {
            Handler::Html(h) => h.field(name),
            Handler::Image(h) | Handler::Audio(h) | Handler::Video(h) | Handler::Generic(h) => {
                h.field(name)
            }
        }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = match self {
            Handler::Html(h) => h.field_names().collect(),
            Handler::Image(h) | Handler::Audio(h) | Handler::Video(h) | Handler::Generic(h) => {
                h.field_names().collect()
            }
        };
        names.sort_unstable();
        names
    }

    /// Whether computing `field` reads the response body
    pub fn needs_body(&self, field: FieldKind) -> bool {
        matches!(self, Handler::Html(_)) && field != FieldKind::Basic
    }

    pub fn compute(&mut self, field: FieldKind, input: &ComputeInput<'_>) -> Result<Value> {
        match self {
            Handler::Html(h) => h.compute(field, input),
            Handler::Image(h) | Handler::Audio(h) | Handler::Video(h) | Handler::Generic(h) => {
                h.compute(field, input)
            }
        }
    }

    /// Discard scratch state derived from the body
    pub fn reset(&mut self) {
        if let Handler::Html(h) = self {
            h.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matches_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(Handler::new(kind).kind(), kind);
        }
    }

    #[test]
    fn test_field_tables() {
        assert_eq!(
            Handler::new(ResourceKind::Html).field_names(),
            vec!["basic", "feeds", "images", "meta"]
        );
        for kind in [
            ResourceKind::Image,
            ResourceKind::Audio,
            ResourceKind::Video,
            ResourceKind::Generic,
        ] {
            let handler = Handler::new(kind);
            assert_eq!(handler.field_names(), vec!["basic", "images", "meta"]);
            assert_eq!(handler.field("feeds"), None);
        }
    }

    #[test]
    fn test_needs_body() {
        let html = Handler::new(ResourceKind::Html);
        assert!(html.needs_body(FieldKind::Meta));
        assert!(!html.needs_body(FieldKind::Basic));
        assert!(!Handler::new(ResourceKind::Image).needs_body(FieldKind::Meta));
    }

    #[test]
    fn test_reset_reparses_body() {
        let mut handler = Handler::new(ResourceKind::Html);
        let first = ComputeInput {
            url: "http://e.com/",
            mime_type: "text/html",
            body: b"<html><title>One</title></html>",
            fallback_thumbnail: "/t.png",
        };
        let second = ComputeInput {
            body: b"<html><title>Two</title></html>",
            ..first
        };

        let meta = handler.compute(FieldKind::Meta, &first).unwrap();
        assert_eq!(meta["title"], "One");

        // parsed markup is reused until reset
        let meta = handler.compute(FieldKind::Meta, &second).unwrap();
        assert_eq!(meta["title"], "One");

        handler.reset();
        let meta = handler.compute(FieldKind::Meta, &second).unwrap();
        assert_eq!(meta["title"], "Two");
    }
}
