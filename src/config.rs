use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{OverlayError, OverlayResult};

/// Width of the cache-busting window. Loads inside one window share a CDN cache entry.
pub const CACHE_BUST_PERIOD_MS: u64 = 2 * 60 * 1000;
/// Upper bound on live templates across every loaded manifest.
pub const MAX_TEMPLATES: usize = 100;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub cache_bust_period_ms: u64,
    pub max_templates: usize,
    /// Keep only this many clock samples. `None` averages every sample ever seen.
    pub clock_window: Option<usize>,
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_bust_period_ms: CACHE_BUST_PERIOD_MS,
            max_templates: MAX_TEMPLATES,
            clock_window: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> OverlayResult<()> {
        if self.cache_bust_period_ms == 0 {
            return Err(OverlayError::invalid_parameter(
                "cache_bust_period_ms must be > 0",
            ));
        }
        if self.max_templates == 0 {
            return Err(OverlayError::invalid_parameter("max_templates must be > 0"));
        }
        if self.clock_window == Some(0) {
            return Err(OverlayError::invalid_parameter(
                "clock_window must be > 0 when set",
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> OverlayResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read registry config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse registry config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
