use crate::error::{PalletError, Result};
use crate::plan::PalletPlan;
use serde_json::{Value, json};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Column names of the spreadsheet export, in order.
pub const CSV_HEADER: &str = "length,width,height,max_height,cartons_per_layer,layers,total,area_utilization_pct,volume_utilization_pct,layout_kind";

/// Serialize a plan as JSON `{ carton, pallet, maxHeight, layer, layers, total, utilization }`.
/// `layer.placements` is always explicit (grids are materialized) so consumers can draw it directly.
pub fn to_json(plan: &PalletPlan) -> Value {
    let placements: Vec<Value> = plan
        .layout
        .resolved_placements()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "index": i + 1,
                "x": p.x,
                "y": p.y,
                "w": p.w,
                "h": p.h,
                "rotated": p.rotated,
            })
        })
        .collect();
    json!({
        "carton": &plan.carton,
        "pallet": &plan.pallet,
        "maxHeight": plan.stack.max_height,
        "layer": {
            "cartonsPerLayer": plan.layout.cartons_per_layer,
            "layoutKind": plan.layout.kind,
            "grid": &plan.layout.grid,
            "strategy": &plan.layout.strategy,
            "placements": placements,
        },
        "layers": plan.max_layers,
        "total": plan.total_cartons,
        "utilization": {
            "area": plan.area_utilization,
            "volume": plan.volume_utilization,
        },
    })
}

/// [`to_json`] as pretty-printed text.
pub fn to_json_pretty(plan: &PalletPlan) -> Result<String> {
    serde_json::to_string_pretty(&to_json(plan)).map_err(|e| PalletError::Encode(e.to_string()))
}

/// One CSV data row matching [`CSV_HEADER`].
pub fn csv_row(plan: &PalletPlan) -> String {
    format!(
        "{},{},{},{},{},{},{},{:.2},{:.2},{}",
        plan.carton.length,
        plan.carton.width,
        plan.carton.height,
        plan.stack.max_height,
        plan.layout.cartons_per_layer,
        plan.max_layers,
        plan.total_cartons,
        plan.area_utilization,
        plan.volume_utilization,
        plan.layout.kind,
    )
}

/// Appends one row per plan to `path`, writing the header first when the file is new or empty.
pub fn append_csv(path: impl AsRef<Path>, plans: &[PalletPlan]) -> Result<()> {
    let path = path.as_ref();
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_header {
        writeln!(file, "{}", CSV_HEADER)?;
    }
    for plan in plans {
        writeln!(file, "{}", csv_row(plan))?;
    }
    Ok(())
}
