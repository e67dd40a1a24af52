use crate::error::{PalletError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle (inches). `x,y` is the bottom-left corner; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x_end(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive far edge along the pallet width (`y + h`).
    pub fn y_end(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x_end() <= self.x_end() && r.y_end() <= self.y_end()
    }
    /// Returns true if the interiors of `self` and `r` overlap. Touching edges do not count.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x_end() || r.x >= self.x_end() || self.y >= r.y_end() || r.y >= self.y_end())
    }
}

/// One carton placed on a layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedRect {
    pub x: u32,
    pub y: u32,
    /// Placed footprint along the pallet length.
    pub w: u32,
    /// Placed footprint along the pallet width.
    pub h: u32,
    /// True if the footprint is `width x length` rather than `length x width`.
    #[serde(default)]
    pub rotated: bool,
}

impl PlacedRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32, rotated: bool) -> Self {
        Self {
            x,
            y,
            w,
            h,
            rotated,
        }
    }
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
    pub fn area(&self) -> u64 {
        self.rect().area()
    }
}

/// Carton dimensions in inches. Length and width are interchangeable under rotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartonSpec {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl CartonSpec {
    /// Creates a carton, rejecting zero dimensions.
    pub fn new(length: u32, width: u32, height: u32) -> Result<Self> {
        let c = Self {
            length,
            width,
            height,
        };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<()> {
        if self.length == 0 || self.width == 0 || self.height == 0 {
            return Err(PalletError::InvalidInput(format!(
                "carton dimensions must be >= 1 (got {}x{}x{})",
                self.length, self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn footprint_area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn volume(&self) -> u64 {
        self.footprint_area() * self.height as u64
    }

    /// Returns `Some(rotated)` if `w x h` is this carton's footprint in either orientation.
    pub fn orientation_of(&self, w: u32, h: u32) -> Option<bool> {
        if w == self.length && h == self.width {
            Some(false)
        } else if w == self.width && h == self.length {
            Some(true)
        } else {
            None
        }
    }
}

/// Pallet footprint and base block (inches).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PalletSpec {
    pub length: u32,
    pub width: u32,
    /// Height of the physical pallet base. Only drawn by the 3D renderer.
    #[serde(default = "default_base_height")]
    pub base_height: u32,
}

fn default_base_height() -> u32 {
    6
}

impl Default for PalletSpec {
    fn default() -> Self {
        Self {
            length: 48,
            width: 40,
            base_height: default_base_height(),
        }
    }
}

impl PalletSpec {
    pub fn new(length: u32, width: u32) -> Self {
        Self {
            length,
            width,
            ..Default::default()
        }
    }
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.length, self.width)
    }
    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }
}

/// Tallest permissible stack (inches).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackConstraint {
    pub max_height: u32,
}

impl Default for StackConstraint {
    fn default() -> Self {
        Self { max_height: 59 }
    }
}

impl StackConstraint {
    pub fn new(max_height: u32) -> Result<Self> {
        if max_height == 0 {
            return Err(PalletError::InvalidInput(
                "max stack height must be >= 1".into(),
            ));
        }
        Ok(Self { max_height })
    }
}

/// How a layer was laid out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Hand-tuned table entry.
    Special,
    /// Grid with the carton length along the pallet length.
    Uniform,
    /// Grid with the carton turned 90°.
    Rotated,
    /// Heuristic arrangement mixing orientations.
    Mixed,
    /// Carton does not fit.
    None,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Special => "special",
            LayoutKind::Uniform => "uniform",
            LayoutKind::Rotated => "rotated",
            LayoutKind::Mixed => "mixed",
            LayoutKind::None => "none",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formula inputs of a uniform grid: `cols x rows` cells of `cell_w x cell_h`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    pub cell_w: u32,
    pub cell_h: u32,
    pub rotated: bool,
}

impl GridLayout {
    /// Grid of `cell_w x cell_h` cells that fits inside `pallet`.
    pub fn fit(pallet: &PalletSpec, cell_w: u32, cell_h: u32, rotated: bool) -> Self {
        let (cols, rows) = if cell_w == 0 || cell_h == 0 {
            (0, 0)
        } else {
            (pallet.length / cell_w, pallet.width / cell_h)
        };
        Self {
            cols,
            rows,
            cell_w,
            cell_h,
            rotated,
        }
    }

    /// Number of cells; saturates instead of wrapping on oversized grids.
    pub fn count(&self) -> u32 {
        self.cols.saturating_mul(self.rows)
    }

    /// Materializes the grid in column-major order: index `i * rows + j` is column `i`, row `j`.
    pub fn placements(&self) -> Vec<PlacedRect> {
        let mut out = Vec::with_capacity(self.count() as usize);
        for i in 0..self.cols {
            for j in 0..self.rows {
                out.push(PlacedRect::new(
                    i * self.cell_w,
                    j * self.cell_h,
                    self.cell_w,
                    self.cell_h,
                    self.rotated,
                ));
            }
        }
        out
    }
}

/// Result of packing one layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerLayout {
    pub cartons_per_layer: u32,
    pub kind: LayoutKind,
    /// Set for `uniform` / `rotated`; placements are reconstructible from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridLayout>,
    /// Explicit placements; empty for `uniform`, `rotated` and `none`.
    #[serde(default)]
    pub placements: Vec<PlacedRect>,
    /// Heuristic or table entry that produced a `mixed` / `special` result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl LayerLayout {
    pub fn none() -> Self {
        Self {
            cartons_per_layer: 0,
            kind: LayoutKind::None,
            grid: None,
            placements: Vec::new(),
            strategy: None,
        }
    }

    pub fn from_grid(grid: GridLayout) -> Self {
        Self {
            cartons_per_layer: grid.count(),
            kind: if grid.rotated {
                LayoutKind::Rotated
            } else {
                LayoutKind::Uniform
            },
            grid: Some(grid),
            placements: Vec::new(),
            strategy: None,
        }
    }

    pub fn explicit(kind: LayoutKind, strategy: impl Into<String>, placements: Vec<PlacedRect>) -> Self {
        Self {
            cartons_per_layer: placements.len() as u32,
            kind,
            grid: None,
            placements,
            strategy: Some(strategy.into()),
        }
    }

    /// Explicit placements for every kind (grids are materialized).
    pub fn resolved_placements(&self) -> Vec<PlacedRect> {
        match &self.grid {
            Some(g) if self.placements.is_empty() => g.placements(),
            _ => self.placements.clone(),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.kind != LayoutKind::None
    }
}
