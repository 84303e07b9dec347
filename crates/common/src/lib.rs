//! `cd-common`: Shared types, errors, and configuration for the clipdeck timeline engine.
//!
//! This crate is the foundation the model and state crates depend on:
//!
//! - **Types**: `ClipId`, `TrackId`, `Millis`, `Point`, `Size`, `PipPreset` (newtypes for safety)
//! - **Time**: millisecond/pixel conversion and timecode formatting
//! - **Errors**: `EditError`, `EditResult` (thiserror-based)
//! - **Config**: `EditorConfig`, `SnapConfig`, `PipDefaults`, `ViewConfig`

pub mod config;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{EditorConfig, PipDefaults, SnapConfig, ViewConfig, BASE_PIXELS_PER_SECOND};
pub use error::{EditError, EditResult, EntityKind};
pub use time::{format_millis, ms_to_pixels, pixels_to_millis, pixels_to_ms};
pub use types::{ClipId, IdAllocator, Millis, PipPreset, Point, Size, TrackId};
