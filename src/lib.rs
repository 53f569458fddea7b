//! Plateforge synthesizes labeled image datasets for robustness testing: it
//! composites an alpha-carrying overlay (typically a license plate) onto
//! background images and runs each composite through a configurable chain of
//! perturbation operators, emitting seed-reproducible image variants plus a
//! structured metadata record per image.
//!
//! # Pipeline overview
//!
//! 1. **Enumerate**: sorted background and overlay paths (order is part of
//!    the determinism contract)
//! 2. **Composite**: overlay centered on the background, alpha-blended,
//!    yielding the overlay [`Region`]
//! 3. **Perturb**: each configured operator in order, all drawing from one
//!    shared seeded RNG
//! 4. **Emit**: final image + [`GenerationRecord`] through a [`DatasetSink`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: one seed, one RNG, seeded once per run.
//! - **Explicit registry**: operator kinds live in a [`PerturbationRegistry`]
//!   value, not in process-global state; registering a new
//!   [`PerturbationKind`] is the only extension point.
#![forbid(unsafe_code)]

pub mod composite;
pub mod config;
pub mod error;
pub mod io;
pub mod metadata;
pub mod perturb;
pub mod pipeline;
pub mod region;

pub use composite::{center_position, composite_centered};
pub use config::{Config, DatasetConfig, LoggingConfig, OperatorConfig};
pub use error::{PlateforgeError, PlateforgeResult};
pub use io::{DatasetSink, DirSink, list_backgrounds, list_overlays, load_rgba};
pub use metadata::{GenerationRecord, PerturbationRecord};
pub use perturb::{
    NoisePerturbation, Perturbation, PerturbationKind, PerturbationRegistry, ShapesPerturbation,
    TexturePerturbation, WarpPerturbation,
};
pub use pipeline::{DatasetPipeline, RunStats};
pub use region::{Region, Scope, map_scoped};
