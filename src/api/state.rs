use std::sync::Arc;

use crate::{render::Renderer, services::BlockService};

/// Shared application state; everything in it is read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub block: Arc<BlockService>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(block: BlockService, renderer: Renderer) -> Self {
        Self {
            block: Arc::new(block),
            renderer: Arc::new(renderer),
        }
    }
}
