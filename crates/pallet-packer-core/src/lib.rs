//! Core library for planning carton layers on a pallet.
//!
//! - Layer packer: hand-tuned special layouts, uniform grid (both orientations), mixed-orientation heuristic
//! - Heuristics: MaxRects (BSSF/BAF/BLSF/BL/CP), Skyline (BL/MW + optional Waste Map), Guillotine (choice + split), Auto portfolio
//! - Plan: layer count, totals, area and volume utilization
//! - Data model is serde-serializable; JSON/CSV export and SVG/PNG renderers are provided.
//!
//! Quick example:
//! ```
//! use pallet_packer_core::{CartonSpec, LayoutKind, PackerConfig, StackConstraint, plan};
//! # fn main() -> pallet_packer_core::Result<()> {
//! let carton = CartonSpec::new(16, 10, 8)?;
//! let stack = StackConstraint::new(59)?;
//! let out = plan(carton, stack, &PackerConfig::default())?;
//! assert_eq!(out.layout.kind, LayoutKind::Uniform);
//! assert_eq!(out.total_cartons, 84);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod layer;
pub mod model;
pub mod packer;
pub mod plan;
pub mod render;
pub mod special;

pub use config::*;
pub use error::*;
pub use export::*;
pub use layer::*;
pub use model::*;
pub use packer::*;
pub use plan::*;
pub use special::*;

/// Convenience prelude for common types and functions.
/// Importing `pallet_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic,
        PackerConfig, PackerConfigBuilder, SkylineHeuristic,
    };
    pub use crate::model::{
        CartonSpec, GridLayout, LayerLayout, LayoutKind, PalletSpec, PlacedRect, Rect,
        StackConstraint,
    };
    pub use crate::plan::{PalletPlan, PlanStats};
    pub use crate::render::RenderOptions;
    pub use crate::special::{Footprint, SpecialLayout};
    pub use crate::{pack, pack_layer, plan};
}
