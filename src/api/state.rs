use std::sync::Arc;

use crate::config::Config;
use crate::resource::Resolver;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<Resolver>,
}

impl AppState {
    pub fn new(config: Config, resolver: Resolver) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        }
    }
}
