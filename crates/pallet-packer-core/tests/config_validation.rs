use pallet_packer_core::prelude::*;
use pallet_packer_core::{MAX_CANDIDATE_SUPPLY, PalletError};

#[test]
fn default_config_is_valid() {
    let cfg = PackerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!((cfg.pallet.length, cfg.pallet.width), (48, 40));
    assert_eq!(cfg.candidate_supply, 1000);
    assert_eq!(cfg.family, AlgorithmFamily::Auto);
}

#[test]
fn zero_pallet_dimension() {
    let cfg = PackerConfig::builder().with_pallet(0, 40).build();
    match cfg.validate() {
        Err(PalletError::InvalidDimensions { length, width }) => {
            assert_eq!(length, 0);
            assert_eq!(width, 40);
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn candidate_supply_bounds() {
    let cfg = PackerConfig::builder().candidate_supply(0).build();
    assert!(matches!(cfg.validate(), Err(PalletError::InvalidConfig(_))));

    let cfg = PackerConfig::builder().candidate_supply(MAX_CANDIDATE_SUPPLY + 1).build();
    match cfg.validate() {
        Err(PalletError::InvalidConfig(msg)) => assert!(msg.contains("candidate_supply")),
        _ => panic!("Expected InvalidConfig error"),
    }
}

#[test]
fn invalid_config_surfaces_from_pack_layer() {
    let cfg = PackerConfig::builder().with_pallet(48, 0).build();
    let carton = CartonSpec::new(10, 10, 10).unwrap();
    assert!(pack_layer(&carton, &cfg).is_err());
}

#[test]
fn custom_special_layout_is_used() {
    let layout = SpecialLayout {
        name: "two-by-one".into(),
        pallet: Footprint { length: 48, width: 40 },
        carton: Footprint { length: 30, width: 20 },
        placements: vec![
            PlacedRect::new(0, 0, 30, 20, false),
            PlacedRect::new(0, 20, 30, 20, false),
            PlacedRect::new(30, 0, 18, 1, false),
        ],
    };
    // third placement has the wrong footprint
    let cfg = PackerConfig::builder().special_layout(layout.clone()).build();
    assert!(matches!(cfg.validate(), Err(PalletError::InvalidConfig(_))));

    let mut fixed = layout;
    fixed.placements.truncate(2);
    let cfg = PackerConfig::builder().special_layout(fixed).build();
    let out = pack_layer(&CartonSpec::new(20, 30, 5).unwrap(), &cfg).unwrap();
    assert_eq!(out.kind, LayoutKind::Special);
    assert_eq!(out.cartons_per_layer, 2);
    assert_eq!(out.strategy.as_deref(), Some("two-by-one"));
    assert!(out.placements.iter().all(|p| p.rotated));
}

#[test]
fn config_roundtrips_through_json_with_defaults() {
    let cfg: PackerConfig = serde_json::from_str(r#"{ "family": "skyline", "use_waste_map": true }"#).unwrap();
    assert_eq!(cfg.family, AlgorithmFamily::Skyline);
    assert!(cfg.use_waste_map);
    assert_eq!(cfg.pallet, PalletSpec::default());
    assert_eq!(cfg.candidate_supply, 1000);
    assert_eq!(cfg.mr_heuristic, MaxRectsHeuristic::BestShortSideFit);
}

#[test]
fn heuristic_names_parse() {
    assert_eq!("bssf".parse::<MaxRectsHeuristic>(), Ok(MaxRectsHeuristic::BestShortSideFit));
    assert_eq!("mw".parse::<SkylineHeuristic>(), Ok(SkylineHeuristic::MinWaste));
    assert_eq!("wlsf".parse::<GuillotineChoice>(), Ok(GuillotineChoice::WorstLongSideFit));
    assert_eq!("maxas".parse::<GuillotineSplit>(), Ok(GuillotineSplit::SplitMaximizeArea));
    assert_eq!("Auto".parse::<AlgorithmFamily>(), Ok(AlgorithmFamily::Auto));
    assert!("nope".parse::<AutoMode>().is_err());
}

#[test]
fn oversized_pallet_is_rejected() {
    let cfg = PackerConfig::builder().with_pallet(u32::MAX, u32::MAX).build();
    assert!(matches!(cfg.validate(), Err(PalletError::InvalidDimensions { .. })));
    let carton = CartonSpec::new(1, 1, 1).unwrap();
    assert!(pack_layer(&carton, &cfg).is_err());

    // largest accepted footprint
    let cfg = PackerConfig::builder().with_pallet(65_536, 65_535).build();
    assert!(cfg.validate().is_ok());
}

#[test]
fn grid_count_saturates() {
    let grid = GridLayout {
        cols: u32::MAX,
        rows: u32::MAX,
        cell_w: 1,
        cell_h: 1,
        rotated: false,
    };
    assert_eq!(grid.count(), u32::MAX);
}
