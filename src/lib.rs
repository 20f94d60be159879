//! Dithered template overlays for collaborative pixel canvases.
//!
//! - [`extract_frame`] cuts one frame out of a sprite sheet.
//! - [`dither`] turns a frame into a sparse, phase-shiftable 3x upscaled pattern.
//! - [`TemplateRegistry`] discovers templates across remote manifests and drives them with a
//!   clock synchronized against the manifest servers.
#![forbid(unsafe_code)]

mod foundation;

pub mod clock;
pub mod config;
pub mod dither;
pub mod fetch;
pub mod frame;
pub mod manifest;
pub mod registry;
pub mod sheet;

pub use crate::foundation::core::{DitherParams, FrameGridSpec, PixelBuffer};
pub use crate::foundation::error::{OverlayError, OverlayResult};

pub use crate::clock::{Clock, ClockSynchronizer, ManualClock, SystemClock, parse_http_date};
pub use crate::config::{CACHE_BUST_PERIOD_MS, MAX_TEMPLATES, RegistryConfig};
pub use crate::dither::{dither, selects};
pub use crate::fetch::{
    FetchCompletion, FetchRequest, FetchResponse, HttpFetcher, ManifestFetcher, cache_busted,
    normalize_url,
};
pub use crate::frame::extract_frame;
pub use crate::manifest::{JsonManifest, TemplateDescriptor, UrlEntry, parse_manifest};
pub use crate::registry::{
    LoadOutcome, ManifestSummary, TemplateEntity, TemplateFactory, TemplateRegistry,
};
pub use crate::sheet::render_sheet;
