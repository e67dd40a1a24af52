//! Hand-tuned layer layouts for specific pallet/carton pairs.
//!
//! Entries are plain data keyed by the pallet footprint and the unordered carton
//! footprint, so adding a layout never adds branching to the layer packer.

use crate::config::PackerConfig;
use crate::error::{PalletError, Result};
use crate::model::{CartonSpec, PalletSpec, PlacedRect, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Footprint as `length x width` (inches).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Footprint {
    pub length: u32,
    pub width: u32,
}

/// A fixed layer layout for one pallet and one carton footprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialLayout {
    pub name: String,
    pub pallet: Footprint,
    pub carton: Footprint,
    pub placements: Vec<PlacedRect>,
}

/// 48x40 pallet, 17x13 carton: a 2x3 block of 17x13 on the left (34x39) plus two
/// 13x17 cartons standing in the 14-wide strip on the right.
const PINWHEEL_17X13: [PlacedRect; 8] = [
    PlacedRect::new(0, 0, 17, 13, false),
    PlacedRect::new(17, 0, 17, 13, false),
    PlacedRect::new(0, 13, 17, 13, false),
    PlacedRect::new(17, 13, 17, 13, false),
    PlacedRect::new(0, 26, 17, 13, false),
    PlacedRect::new(17, 26, 17, 13, false),
    PlacedRect::new(34, 0, 13, 17, true),
    PlacedRect::new(34, 17, 13, 17, true),
];

/// Built-in table.
pub fn builtin_layouts() -> Vec<SpecialLayout> {
    vec![SpecialLayout {
        name: "48x40-17x13-block-and-strip".into(),
        pallet: Footprint {
            length: 48,
            width: 40,
        },
        carton: Footprint {
            length: 17,
            width: 13,
        },
        placements: PINWHEEL_17X13.to_vec(),
    }]
}

impl SpecialLayout {
    /// Checks that every placement is the carton footprint in one orientation, lies on
    /// the pallet, and does not overlap another placement.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| PalletError::InvalidConfig(format!("special layout '{}': {}", self.name, msg));
        if self.pallet.length == 0 || self.pallet.width == 0 {
            return Err(bad("pallet dimensions must be >= 1".into()));
        }
        if self.carton.length == 0 || self.carton.width == 0 {
            return Err(bad("carton dimensions must be >= 1".into()));
        }
        if self.placements.is_empty() {
            return Err(bad("no placements".into()));
        }
        let carton = CartonSpec {
            length: self.carton.length,
            width: self.carton.width,
            height: 1,
        };
        let bounds = Rect::new(0, 0, self.pallet.length, self.pallet.width);
        for (i, p) in self.placements.iter().enumerate() {
            if carton.orientation_of(p.w, p.h).is_none() {
                return Err(bad(format!(
                    "placement #{} is {}x{}, not a {}x{} carton",
                    i + 1,
                    p.w,
                    p.h,
                    self.carton.length,
                    self.carton.width
                )));
            }
            if !bounds.contains(&p.rect()) {
                return Err(bad(format!("placement #{} leaves the pallet", i + 1)));
            }
            for (j, q) in self.placements.iter().enumerate().skip(i + 1) {
                if p.rect().intersects(&q.rect()) {
                    return Err(bad(format!(
                        "placements #{} and #{} overlap",
                        i + 1,
                        j + 1
                    )));
                }
            }
        }
        Ok(())
    }

    fn key(&self) -> SpecialKey {
        SpecialKey::new(
            self.pallet.length,
            self.pallet.width,
            self.carton.length,
            self.carton.width,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SpecialKey {
    pallet_length: u32,
    pallet_width: u32,
    short_side: u32,
    long_side: u32,
}

impl SpecialKey {
    fn new(pallet_length: u32, pallet_width: u32, a: u32, b: u32) -> Self {
        Self {
            pallet_length,
            pallet_width,
            short_side: a.min(b),
            long_side: a.max(b),
        }
    }
}

/// Lookup table of special layouts.
#[derive(Debug, Clone, Default)]
pub struct SpecialLayouts {
    entries: HashMap<SpecialKey, SpecialLayout>,
}

impl SpecialLayouts {
    /// Built-in entries (when enabled) overlaid with the configured ones.
    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        let mut table = Self::default();
        if cfg.builtin_special_layouts {
            for layout in builtin_layouts() {
                table.insert(layout)?;
            }
        }
        for layout in &cfg.special_layouts {
            table.insert(layout.clone())?;
        }
        Ok(table)
    }

    /// Adds or replaces the entry for the layout's pallet and carton pair.
    pub fn insert(&mut self, layout: SpecialLayout) -> Result<()> {
        layout.validate()?;
        self.entries.insert(layout.key(), layout);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the layout for `carton` on `pallet`; carton length/width order does not matter.
    pub fn lookup(&self, pallet: &PalletSpec, carton: &CartonSpec) -> Option<&SpecialLayout> {
        self.entries.get(&SpecialKey::new(
            pallet.length,
            pallet.width,
            carton.length,
            carton.width,
        ))
    }

    /// Placements of the matching layout with `rotated` expressed relative to `carton`.
    pub fn placements_for(&self, pallet: &PalletSpec, carton: &CartonSpec) -> Option<(&str, Vec<PlacedRect>)> {
        let layout = self.lookup(pallet, carton)?;
        let placements = layout
            .placements
            .iter()
            .map(|p| {
                let rotated = carton.orientation_of(p.w, p.h).unwrap_or(p.rotated);
                PlacedRect::new(p.x, p.y, p.w, p.h, rotated)
            })
            .collect();
        Some((layout.name.as_str(), placements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        for layout in builtin_layouts() {
            layout.validate().expect("built-in layout must validate");
        }
    }

    #[test]
    fn lookup_ignores_carton_order() {
        let table = SpecialLayouts::from_config(&PackerConfig::default()).unwrap();
        let pallet = PalletSpec::default();
        let a = CartonSpec::new(17, 13, 10).unwrap();
        let b = CartonSpec::new(13, 17, 10).unwrap();
        assert!(table.lookup(&pallet, &a).is_some());
        assert!(table.lookup(&pallet, &b).is_some());
        assert!(table.lookup(&PalletSpec::new(48, 48), &a).is_none());
    }

    #[test]
    fn rotated_flag_follows_input_orientation() {
        let table = SpecialLayouts::from_config(&PackerConfig::default()).unwrap();
        let pallet = PalletSpec::default();
        let (_, as_given) = table
            .placements_for(&pallet, &CartonSpec::new(17, 13, 1).unwrap())
            .unwrap();
        let (_, swapped) = table
            .placements_for(&pallet, &CartonSpec::new(13, 17, 1).unwrap())
            .unwrap();
        assert_eq!(as_given.iter().filter(|p| p.rotated).count(), 2);
        assert_eq!(swapped.iter().filter(|p| p.rotated).count(), 6);
    }

    #[test]
    fn overlapping_layout_is_rejected() {
        let layout = SpecialLayout {
            name: "broken".into(),
            pallet: Footprint {
                length: 48,
                width: 40,
            },
            carton: Footprint {
                length: 10,
                width: 10,
            },
            placements: vec![
                PlacedRect::new(0, 0, 10, 10, false),
                PlacedRect::new(5, 5, 10, 10, false),
            ],
        };
        assert!(matches!(layout.validate(), Err(PalletError::InvalidConfig(_))));
    }

    #[test]
    fn wrong_footprint_is_rejected() {
        let layout = SpecialLayout {
            name: "wrong".into(),
            pallet: Footprint {
                length: 48,
                width: 40,
            },
            carton: Footprint {
                length: 10,
                width: 8,
            },
            placements: vec![PlacedRect::new(0, 0, 10, 10, false)],
        };
        assert!(layout.validate().is_err());
    }
}
