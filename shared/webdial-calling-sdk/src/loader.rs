//! Vendor SDK loading registry
//!
//! The vendor SDK arrives out-of-band (the embedding shell loads it) and
//! installs a client factory here when it is ready. Consumers poll
//! `is_loaded` the same way the shell polls the script's readiness flag.

use std::sync::{Arc, OnceLock, RwLock};

use crate::client::{RtcClient, RtcError, RtcOptions};

/// Builds a vendor client from a token, once the SDK has loaded.
pub trait RtcClientFactory: Send + Sync {
    fn create(&self, token: &str, options: RtcOptions) -> Result<Arc<dyn RtcClient>, RtcError>;
}

/// Registry for the vendor client factory.
///
/// `SdkLoader::global()` is the process-wide registry the embedding
/// shell installs into; independent instances exist for tests.
#[derive(Clone, Default)]
pub struct SdkLoader {
    factory: Arc<RwLock<Option<Arc<dyn RtcClientFactory>>>>,
}

impl SdkLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Self {
        static GLOBAL: OnceLock<SdkLoader> = OnceLock::new();
        GLOBAL.get_or_init(SdkLoader::new).clone()
    }

    /// Install the factory; flips the loader to loaded.
    pub fn register(&self, factory: Arc<dyn RtcClientFactory>) {
        if let Ok(mut slot) = self.factory.write() {
            *slot = Some(factory);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.factory.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    pub fn factory(&self) -> Option<Arc<dyn RtcClientFactory>> {
        self.factory.read().ok().and_then(|slot| slot.clone())
    }
}
