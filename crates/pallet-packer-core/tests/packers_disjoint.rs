use pallet_packer_core::packer::guillotine::GuillotinePacker;
use pallet_packer_core::packer::maxrects::MaxRectsPacker;
use pallet_packer_core::packer::skyline::SkylinePacker;
use pallet_packer_core::packer::{Packer, fill};
use pallet_packer_core::prelude::*;
use rand::{Rng, SeedableRng};

fn disjoint(rects: &[PlacedRect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].rect().intersects(&rects[j].rect()) {
                return false;
            }
        }
    }
    true
}

fn packers(bin: Rect) -> Vec<(&'static str, Box<dyn Packer>)> {
    vec![
        ("maxrects-baf", Box::new(MaxRectsPacker::new(bin, true, MaxRectsHeuristic::BestAreaFit))),
        ("maxrects-cp", Box::new(MaxRectsPacker::new(bin, true, MaxRectsHeuristic::ContactPoint))),
        ("skyline-bl", Box::new(SkylinePacker::new(bin, true, SkylineHeuristic::BottomLeft, false))),
        ("skyline-mw-wm", Box::new(SkylinePacker::new(bin, true, SkylineHeuristic::MinWaste, true))),
        (
            "guillotine",
            Box::new(GuillotinePacker::new(
                bin,
                true,
                GuillotineChoice::BestAreaFit,
                GuillotineSplit::SplitShorterLeftoverAxis,
            )),
        ),
    ]
}

#[test]
fn random_sizes_stay_disjoint_and_in_bin() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let rects: Vec<(u32, u32)> = (0..120)
        .map(|_| (rng.gen_range(1..=20), rng.gen_range(1..=20)))
        .collect();
    let bin = Rect::new(0, 0, 96, 80);
    for (name, mut p) in packers(bin) {
        let mut placed = Vec::new();
        for &(w, h) in &rects {
            if let Some(r) = p.pack(w, h) {
                assert!(
                    (r.w, r.h) == (w, h) || (r.w, r.h) == (h, w),
                    "{name}: wrong size"
                );
                placed.push(r);
            }
        }
        assert!(!placed.is_empty(), "{name}: nothing placed");
        assert!(disjoint(&placed), "{name}: overlap");
        assert!(placed.iter().all(|r| bin.contains(&r.rect())), "{name}: out of bin");
    }
}

#[test]
fn repeatable_placements() {
    let bin = Rect::new(0, 0, 48, 40);
    let candidates: Vec<(u32, u32)> = (0..50).flat_map(|_| [(15, 11), (11, 15)]).collect();
    let first: Vec<Vec<PlacedRect>> = packers(bin)
        .into_iter()
        .map(|(_, mut p)| fill(p.as_mut(), &candidates, usize::MAX))
        .collect();
    let second: Vec<Vec<PlacedRect>> = packers(bin)
        .into_iter()
        .map(|(_, mut p)| fill(p.as_mut(), &candidates, usize::MAX))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn fill_respects_limit_and_stops_when_full() {
    let bin = Rect::new(0, 0, 48, 40);
    let candidates = vec![(12, 10); 1000];
    let mut p = MaxRectsPacker::new(bin, false, MaxRectsHeuristic::BestShortSideFit);
    assert_eq!(fill(&mut p, &candidates, 5).len(), 5);

    let mut p = MaxRectsPacker::new(bin, false, MaxRectsHeuristic::BestShortSideFit);
    assert_eq!(fill(&mut p, &candidates, usize::MAX).len(), 16);
}
