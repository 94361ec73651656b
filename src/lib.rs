pub mod api;
pub mod cache;
pub mod codec;
pub mod config;
pub mod fetch;
pub mod handlers;
pub mod humanize;
pub mod markup;
pub mod observability;
pub mod resource;
pub mod url_norm;
