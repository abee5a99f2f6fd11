// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::mount::MountTable;
use crate::resolve::ResolveOptions;

/// Application state
///
/// Built once before the listener is bound and never mutated afterwards,
/// so request tasks read it without locking.
pub struct AppState {
    pub config: Config,
    pub mounts: Arc<MountTable>,
    pub resolve_options: ResolveOptions,
}

impl AppState {
    pub fn new(config: Config, mounts: MountTable) -> Self {
        let resolve_options = ResolveOptions {
            follow_symlinks: config.http.follow_symlinks,
        };

        Self {
            config,
            mounts: Arc::new(mounts),
            resolve_options,
        }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
