use pallet_packer_core::prelude::*;
use pallet_packer_core::{area_bound, grid_candidates};
use rand::{Rng, SeedableRng};

fn assert_valid(layout: &LayerLayout, carton: &CartonSpec, pallet: &PalletSpec) {
    let placements = layout.resolved_placements();
    assert_eq!(placements.len(), layout.cartons_per_layer as usize);
    let bounds = pallet.bounds();
    for (i, a) in placements.iter().enumerate() {
        assert!(bounds.contains(&a.rect()), "{a:?} leaves the pallet");
        assert_eq!(
            carton.orientation_of(a.w, a.h),
            Some(a.rotated),
            "{a:?} is not a {}x{} carton",
            carton.length,
            carton.width
        );
        for b in placements.iter().skip(i + 1) {
            assert!(!a.rect().intersects(&b.rect()), "{a:?} overlaps {b:?}");
        }
    }
    match layout.kind {
        LayoutKind::Uniform | LayoutKind::Rotated | LayoutKind::None => {
            assert!(layout.placements.is_empty())
        }
        LayoutKind::Mixed | LayoutKind::Special => assert!(!layout.placements.is_empty()),
    }
}

#[test]
fn never_worse_than_best_grid() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let cfg = PackerConfig::default();
    for _ in 0..60 {
        let carton = CartonSpec::new(rng.gen_range(3..=30), rng.gen_range(3..=30), 6).unwrap();
        let layout = pack_layer(&carton, &cfg).unwrap();
        let (a, b) = grid_candidates(&carton, &cfg.pallet);
        assert!(layout.cartons_per_layer >= a.count().max(b.count()));
        assert!(layout.cartons_per_layer as u64 <= area_bound(&carton, &cfg.pallet));
        assert_valid(&layout, &carton, &cfg.pallet);
    }
}

#[test]
fn every_family_keeps_placements_valid() {
    let families = [
        PackerConfig::builder().family(AlgorithmFamily::MaxRects).mr_heuristic(MaxRectsHeuristic::BestAreaFit).build(),
        PackerConfig::builder().family(AlgorithmFamily::MaxRects).mr_heuristic(MaxRectsHeuristic::BestLongSideFit).build(),
        PackerConfig::builder().family(AlgorithmFamily::MaxRects).mr_heuristic(MaxRectsHeuristic::BottomLeft).build(),
        PackerConfig::builder().family(AlgorithmFamily::MaxRects).mr_heuristic(MaxRectsHeuristic::ContactPoint).build(),
        PackerConfig::builder().family(AlgorithmFamily::Skyline).skyline_heuristic(SkylineHeuristic::BottomLeft).build(),
        PackerConfig::builder().family(AlgorithmFamily::Skyline).skyline_heuristic(SkylineHeuristic::MinWaste).use_waste_map(true).build(),
        PackerConfig::builder().family(AlgorithmFamily::Guillotine).g_choice(GuillotineChoice::BestShortSideFit).g_split(GuillotineSplit::SplitLongerLeftoverAxis).build(),
        PackerConfig::builder().family(AlgorithmFamily::Guillotine).g_choice(GuillotineChoice::WorstAreaFit).g_split(GuillotineSplit::SplitMinimizeArea).build(),
        PackerConfig::builder().auto_mode(AutoMode::Fast).build(),
    ];
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let cartons: Vec<CartonSpec> = (0..25)
        .map(|_| CartonSpec::new(rng.gen_range(2..=45), rng.gen_range(2..=45), 4).unwrap())
        .collect();
    for cfg in &families {
        for carton in &cartons {
            let layout = pack_layer(carton, cfg).unwrap();
            assert_valid(&layout, carton, &cfg.pallet);
        }
    }
}

#[test]
fn other_pallet_sizes() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
    for _ in 0..30 {
        let cfg = PackerConfig::builder()
            .with_pallet(rng.gen_range(20..=60), rng.gen_range(20..=60))
            .build();
        let carton = CartonSpec::new(rng.gen_range(1..=25), rng.gen_range(1..=25), 3).unwrap();
        let layout = pack_layer(&carton, &cfg).unwrap();
        assert_valid(&layout, &carton, &cfg.pallet);
    }
}

#[test]
fn small_candidate_supply_caps_mixed_count() {
    // 3x2 on 5x5 needs a mixed layout; with one candidate per orientation it cannot exceed 2.
    let cfg = PackerConfig::builder().with_pallet(5, 5).candidate_supply(1).build();
    let layout = pack_layer(&CartonSpec::new(3, 2, 1).unwrap(), &cfg).unwrap();
    assert_eq!(layout.cartons_per_layer, 2);
    assert_ne!(layout.kind, LayoutKind::Mixed);
}

#[test]
fn time_budget_still_runs_first_candidate() {
    // 7x5 on 48x40: grid holds 48, the area bound is 54
    let carton = CartonSpec::new(7, 5, 4).unwrap();
    let full = PackerConfig::default();
    let tight = PackerConfig::builder().time_budget_ms(Some(1)).build();

    let (strategy, placements) = pallet_packer_core::pack_mixed(&carton, &tight);
    assert!(!placements.is_empty());
    let names: Vec<String> = pallet_packer_core::portfolio(&full)
        .iter()
        .map(pallet_packer_core::strategy_name)
        .collect();
    assert!(names.contains(&strategy), "{strategy} is not in the portfolio");
    let (_, best) = pallet_packer_core::pack_mixed(&carton, &full);
    assert!(placements.len() <= best.len());

    let layout = pack_layer(&carton, &tight).unwrap();
    assert!(layout.cartons_per_layer >= 48);
    assert_valid(&layout, &carton, &tight.pallet);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_portfolio_matches_sequential() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(99);
    let sequential = PackerConfig::default();
    let parallel = PackerConfig::builder().parallel(true).build();
    for _ in 0..30 {
        let carton = CartonSpec::new(rng.gen_range(3..=25), rng.gen_range(3..=25), 5).unwrap();
        let a = pack_layer(&carton, &sequential).unwrap();
        let b = pack_layer(&carton, &parallel).unwrap();
        assert_eq!(a, b, "carton {}x{}", carton.length, carton.width);
    }
}
