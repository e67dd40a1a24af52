//! Layer packer: picks the best single-layer layout for one carton on one pallet.
//!
//! Order of evaluation:
//! 1. special-layout table (hand-tuned, wins outright)
//! 2. uniform grid in both orientations (ties keep the unrotated grid)
//! 3. mixed-orientation heuristic, used only when it strictly beats the grid

use crate::config::{
    AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig,
    SkylineHeuristic,
};
use crate::error::Result;
use crate::model::{CartonSpec, GridLayout, LayerLayout, LayoutKind, PalletSpec, PlacedRect, StackConstraint};
use crate::packer::{
    Packer, fill, guillotine::GuillotinePacker, maxrects::MaxRectsPacker, skyline::SkylinePacker,
};
use crate::plan::ensure_fits_stack;
use crate::special::SpecialLayouts;
use std::time::Instant;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Packs a layer with the default 48x40 configuration.
///
/// `max_height` is only checked here (carton height must not exceed it); layer count
/// and totals live in [`crate::plan::plan`].
pub fn pack(length: u32, width: u32, height: u32, max_height: u32) -> Result<LayerLayout> {
    let carton = CartonSpec::new(length, width, height)?;
    let stack = StackConstraint::new(max_height)?;
    ensure_fits_stack(&carton, &stack)?;
    pack_layer(&carton, &PackerConfig::default())
}

/// Uniform grids for orientation A (`length x width`) and B (`width x length`).
pub fn grid_candidates(carton: &CartonSpec, pallet: &PalletSpec) -> (GridLayout, GridLayout) {
    (
        GridLayout::fit(pallet, carton.length, carton.width, false),
        GridLayout::fit(pallet, carton.width, carton.length, true),
    )
}

/// Best grid; ties prefer orientation A.
pub fn best_grid(carton: &CartonSpec, pallet: &PalletSpec) -> GridLayout {
    let (a, b) = grid_candidates(carton, pallet);
    if a.count() >= b.count() { a } else { b }
}

/// Upper bound on cartons per layer from area alone.
pub fn area_bound(carton: &CartonSpec, pallet: &PalletSpec) -> u64 {
    pallet.area() / carton.footprint_area().max(1)
}

#[instrument(skip_all, fields(length = carton.length, width = carton.width))]
/// Computes the best layer layout for `carton` on `cfg.pallet`.
///
/// Notes:
/// - The caller guards `carton.height <= max_height`; this function ignores height.
/// - Deterministic: identical inputs give identical layouts.
/// - Infeasible cartons yield `LayoutKind::None`, not an error.
pub fn pack_layer(carton: &CartonSpec, cfg: &PackerConfig) -> Result<LayerLayout> {
    carton.validate()?;
    cfg.validate()?;
    let pallet = &cfg.pallet;

    let specials = SpecialLayouts::from_config(cfg)?;
    debug!(entries = specials.len(), "special layouts loaded");
    if let Some((name, placements)) = specials.placements_for(pallet, carton) {
        debug!(name, count = placements.len(), "special layout");
        return Ok(LayerLayout::explicit(LayoutKind::Special, name, placements));
    }

    let grid = best_grid(carton, pallet);
    let bound = area_bound(carton, pallet);
    debug!(count = grid.count(), rotated = grid.rotated, bound, "best grid");

    // A grid that already reaches the area bound cannot be beaten.
    if grid.count() > 0 && grid.count() as u64 >= bound {
        return Ok(LayerLayout::from_grid(grid));
    }

    let (strategy, mixed) = pack_mixed(carton, cfg);
    debug!(strategy = %strategy, count = mixed.len(), "mixed heuristic");

    if grid.count() > 0 && grid.count() as usize >= mixed.len() {
        Ok(LayerLayout::from_grid(grid))
    } else if !mixed.is_empty() {
        Ok(LayerLayout::explicit(LayoutKind::Mixed, strategy, mixed))
    } else {
        Ok(LayerLayout::none())
    }
}

/// Runs the configured mixed-orientation heuristic (or the Auto portfolio).
/// Returns the strategy name and its placements.
pub fn pack_mixed(carton: &CartonSpec, cfg: &PackerConfig) -> (String, Vec<PlacedRect>) {
    if matches!(cfg.family, AlgorithmFamily::Auto) {
        return pack_auto(carton, cfg);
    }
    run_candidate(carton, cfg)
}

/// Fixed portfolio for Auto; order is the tie-break order.
pub fn portfolio(base: &PackerConfig) -> Vec<PackerConfig> {
    let mr = |h: MaxRectsHeuristic| {
        let mut c = base.clone();
        c.family = AlgorithmFamily::MaxRects;
        c.mr_heuristic = h;
        c
    };
    let sky = |h: SkylineHeuristic, waste: bool| {
        let mut c = base.clone();
        c.family = AlgorithmFamily::Skyline;
        c.skyline_heuristic = h;
        c.use_waste_map = waste;
        c
    };
    match base.auto_mode {
        AutoMode::Fast => vec![
            mr(MaxRectsHeuristic::BestShortSideFit),
            sky(SkylineHeuristic::BottomLeft, false),
        ],
        AutoMode::Quality => {
            let mut g = base.clone();
            g.family = AlgorithmFamily::Guillotine;
            g.g_choice = GuillotineChoice::BestAreaFit;
            g.g_split = GuillotineSplit::SplitShorterLeftoverAxis;
            vec![
                mr(MaxRectsHeuristic::BestShortSideFit),
                mr(MaxRectsHeuristic::BestAreaFit),
                mr(MaxRectsHeuristic::BottomLeft),
                mr(MaxRectsHeuristic::ContactPoint),
                sky(SkylineHeuristic::MinWaste, true),
                g,
            ]
        }
    }
}

fn pack_auto(carton: &CartonSpec, base: &PackerConfig) -> (String, Vec<PlacedRect>) {
    let candidates = portfolio(base);

    // Parallel path (optional)
    #[cfg(feature = "parallel")]
    {
        if base.parallel {
            let results: Vec<(String, Vec<PlacedRect>)> = candidates
                .par_iter()
                .map(|cand| run_candidate(carton, cand))
                .collect();
            return pick_best(results);
        }
    }

    // Sequential path with optional time budget
    let budget_ms = base.time_budget_ms.unwrap_or(0);
    let start = Instant::now();
    let mut results = Vec::with_capacity(candidates.len());
    for cand in &candidates {
        if budget_ms > 0 && !results.is_empty() && start.elapsed().as_millis() as u64 > budget_ms {
            debug!(evaluated = results.len(), "time budget exhausted");
            break;
        }
        results.push(run_candidate(carton, cand));
    }
    pick_best(results)
}

/// Highest count wins; the earliest candidate wins ties.
fn pick_best(results: Vec<(String, Vec<PlacedRect>)>) -> (String, Vec<PlacedRect>) {
    let mut best: Option<(String, Vec<PlacedRect>)> = None;
    for (name, placements) in results {
        if best.as_ref().is_none_or(|(_, b)| placements.len() > b.len()) {
            best = Some((name, placements));
        }
    }
    best.unwrap_or_else(|| ("none".to_string(), Vec::new()))
}

fn build_packer(cfg: &PackerConfig) -> Box<dyn Packer> {
    let bin = cfg.pallet.bounds();
    match cfg.family {
        AlgorithmFamily::Skyline => Box::new(SkylinePacker::new(
            bin,
            cfg.allow_rotation,
            cfg.skyline_heuristic,
            cfg.use_waste_map,
        )),
        AlgorithmFamily::Guillotine => Box::new(GuillotinePacker::new(
            bin,
            cfg.allow_rotation,
            cfg.g_choice,
            cfg.g_split,
        )),
        AlgorithmFamily::MaxRects | AlgorithmFamily::Auto => {
            Box::new(MaxRectsPacker::new(bin, cfg.allow_rotation, cfg.mr_heuristic))
        }
    }
}

/// Human-readable name of a single (non-Auto) heuristic configuration.
pub fn strategy_name(cfg: &PackerConfig) -> String {
    match cfg.family {
        AlgorithmFamily::Skyline => format!(
            "skyline-{}{}",
            cfg.skyline_heuristic.short_name(),
            if cfg.use_waste_map { "-wastemap" } else { "" }
        ),
        AlgorithmFamily::Guillotine => format!(
            "guillotine-{}-{}",
            cfg.g_choice.short_name(),
            cfg.g_split.short_name()
        ),
        AlgorithmFamily::MaxRects | AlgorithmFamily::Auto => {
            format!("maxrects-{}", cfg.mr_heuristic.short_name())
        }
    }
}

/// Both orientations, interleaved, `supply` of each.
fn candidate_supply(carton: &CartonSpec, supply: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(supply as usize * 2);
    for _ in 0..supply {
        out.push((carton.length, carton.width));
        out.push((carton.width, carton.length));
    }
    out
}

fn run_candidate(carton: &CartonSpec, cfg: &PackerConfig) -> (String, Vec<PlacedRect>) {
    let mut packer = build_packer(cfg);
    let candidates = candidate_supply(carton, cfg.candidate_supply);
    let limit = area_bound(carton, &cfg.pallet) as usize;
    let placements = fill(packer.as_mut(), &candidates, limit)
        .into_iter()
        .map(|p| {
            let rotated = carton.orientation_of(p.w, p.h).unwrap_or(p.rotated);
            PlacedRect::new(p.x, p.y, p.w, p.h, rotated)
        })
        .collect::<Vec<_>>();
    let name = strategy_name(cfg);
    debug!(strategy = %name, count = placements.len(), "candidate");
    (name, placements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_tie_prefers_unrotated() {
        // 10x10 is symmetric; 12x8 on 48x40: A = 4*5 = 20, B = 6*3 = 18
        let pallet = PalletSpec::default();
        let sq = CartonSpec::new(10, 10, 5).unwrap();
        assert!(!best_grid(&sq, &pallet).rotated);
        let c = CartonSpec::new(12, 8, 5).unwrap();
        let g = best_grid(&c, &pallet);
        assert!(!g.rotated);
        assert_eq!(g.count(), 20);
    }

    #[test]
    fn rotated_grid_when_b_wins() {
        // A: 48/10 * 40/16 = 4*2 = 8; B: 48/16 * 40/10 = 3*4 = 12
        let pallet = PalletSpec::default();
        let c = CartonSpec::new(10, 16, 5).unwrap();
        let g = best_grid(&c, &pallet);
        assert!(g.rotated);
        assert_eq!(g.count(), 12);
    }

    #[test]
    fn pick_best_keeps_earliest_on_tie() {
        let p = PlacedRect::new(0, 0, 1, 1, false);
        let best = pick_best(vec![
            ("first".into(), vec![p]),
            ("second".into(), vec![p]),
            ("third".into(), vec![]),
        ]);
        assert_eq!(best.0, "first");
    }

    #[test]
    fn candidate_supply_interleaves() {
        let c = CartonSpec::new(5, 3, 1).unwrap();
        let s = candidate_supply(&c, 2);
        assert_eq!(s, vec![(5, 3), (3, 5), (5, 3), (3, 5)]);
    }

    #[test]
    fn strategy_names() {
        let cfg = PackerConfig::builder().family(AlgorithmFamily::Skyline).use_waste_map(true).build();
        assert_eq!(strategy_name(&cfg), "skyline-bl-wastemap");
        assert_eq!(strategy_name(&PackerConfig::default()), "maxrects-bssf");
    }
}
