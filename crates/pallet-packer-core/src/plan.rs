//! Caller-side planning around the layer packer: input guards, layer count,
//! totals and utilization.

use crate::config::PackerConfig;
use crate::error::{PalletError, Result};
use crate::layer::pack_layer;
use crate::model::{CartonSpec, LayerLayout, LayoutKind, PalletSpec, StackConstraint};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// A full pallet plan: one layer layout stacked `max_layers` times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PalletPlan {
    pub carton: CartonSpec,
    pub pallet: PalletSpec,
    pub stack: StackConstraint,
    pub layout: LayerLayout,
    pub max_layers: u32,
    pub total_cartons: u64,
    /// Percent of the pallet footprint covered by one layer.
    pub area_utilization: f64,
    /// Percent of `footprint x max_height` filled by cartons (pallet base excluded).
    pub volume_utilization: f64,
}

/// Rejects cartons taller than the permitted stack.
pub fn ensure_fits_stack(carton: &CartonSpec, stack: &StackConstraint) -> Result<()> {
    if carton.height > stack.max_height {
        return Err(PalletError::HeightExceedsMax {
            height: carton.height,
            max_height: stack.max_height,
        });
    }
    Ok(())
}

#[instrument(skip_all)]
/// Validates inputs, packs one layer and derives the stacking metrics.
pub fn plan(carton: CartonSpec, stack: StackConstraint, cfg: &PackerConfig) -> Result<PalletPlan> {
    carton.validate()?;
    if stack.max_height == 0 {
        return Err(PalletError::InvalidInput(
            "max stack height must be >= 1".into(),
        ));
    }
    ensure_fits_stack(&carton, &stack)?;

    let layout = pack_layer(&carton, cfg)?;
    let pallet = cfg.pallet;
    let max_layers = stack.max_height / carton.height;
    let total_cartons = layout.cartons_per_layer as u64 * max_layers as u64;
    let area_utilization = area_utilization(&layout, &pallet);
    let volume_utilization = volume_utilization(&carton, &pallet, &stack, total_cartons);

    info!(
        kind = %layout.kind,
        per_layer = layout.cartons_per_layer,
        layers = max_layers,
        total = total_cartons,
        "pallet planned"
    );

    Ok(PalletPlan {
        carton,
        pallet,
        stack,
        layout,
        max_layers,
        total_cartons,
        area_utilization,
        volume_utilization,
    })
}

/// Sum of placed areas over the pallet area, as a percentage.
pub fn area_utilization(layout: &LayerLayout, pallet: &PalletSpec) -> f64 {
    let used: u64 = layout.resolved_placements().iter().map(|p| p.area()).sum();
    percent(used, pallet.area())
}

/// Stacked carton volume over `pallet footprint x max_height`, as a percentage.
pub fn volume_utilization(
    carton: &CartonSpec,
    pallet: &PalletSpec,
    stack: &StackConstraint,
    total_cartons: u64,
) -> f64 {
    percent(
        total_cartons * carton.volume(),
        pallet.area() * stack.max_height as u64,
    )
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Layer-level statistics of a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanStats {
    pub kind: LayoutKind,
    pub cartons_per_layer: u32,
    pub layers: u32,
    pub total_cartons: u64,
    /// Pallet footprint area.
    pub pallet_area: u64,
    /// Footprint area covered by one layer.
    pub used_area: u64,
    /// Number of cartons turned 90°.
    pub num_rotated: usize,
    pub area_utilization: f64,
    pub volume_utilization: f64,
}

impl PalletPlan {
    /// Computes layer statistics for this plan.
    pub fn stats(&self) -> PlanStats {
        let placements = self.layout.resolved_placements();
        PlanStats {
            kind: self.layout.kind,
            cartons_per_layer: self.layout.cartons_per_layer,
            layers: self.max_layers,
            total_cartons: self.total_cartons,
            pallet_area: self.pallet.area(),
            used_area: placements.iter().map(|p| p.area()).sum(),
            num_rotated: placements.iter().filter(|p| p.rotated).count(),
            area_utilization: self.area_utilization,
            volume_utilization: self.volume_utilization,
        }
    }

    pub fn fits(&self) -> bool {
        self.layout.is_feasible()
    }
}

impl PlanStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Layout: {}, Cartons/layer: {}, Layers: {}, Total: {}, Area: {:.2}%, Volume: {:.2}%, Rotated: {}",
            self.kind,
            self.cartons_per_layer,
            self.layers,
            self.total_cartons,
            self.area_utilization,
            self.volume_utilization,
            self.num_rotated,
        )
    }

    /// Returns uncovered footprint area of one layer.
    pub fn wasted_area(&self) -> u64 {
        self.pallet_area.saturating_sub(self.used_area)
    }

    /// Returns wasted footprint as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        percent(self.wasted_area(), self.pallet_area)
    }
}
