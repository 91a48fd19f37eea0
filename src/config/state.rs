// Application state module
// Everything a connection needs, built once at startup and shared read-only

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::routing::Router;
use crate::templates::TemplateStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Immutable after startup
    pub router: Router,
    pub templates: TemplateStore,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, router: Router) -> Self {
        let templates = TemplateStore::new(&config.site.templates_dir)
            .with_static_prefix(&config.site.static_prefix);
        Self {
            config,
            router,
            templates,
            active_connections: AtomicUsize::new(0),
        }
    }
}
