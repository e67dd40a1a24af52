use pallet_packer_core::prelude::*;
use pallet_packer_core::PalletError;

#[test]
fn stats_summary_and_waste() {
    let carton = CartonSpec::new(17, 13, 10).unwrap();
    let out = plan(carton, StackConstraint::new(72).unwrap(), &PackerConfig::default()).unwrap();
    let stats = out.stats();
    assert_eq!(stats.kind, LayoutKind::Special);
    assert_eq!(stats.pallet_area, 1920);
    assert_eq!(stats.used_area, 8 * 221);
    assert_eq!(stats.wasted_area(), 1920 - 8 * 221);
    assert_eq!(stats.num_rotated, 2);
    assert!((stats.waste_percentage() + stats.area_utilization - 100.0).abs() < 1e-9);
    let s = stats.summary();
    assert!(s.contains("special"));
    assert!(s.contains("Total: 56"));
}

#[test]
fn volume_excludes_pallet_base() {
    let carton = CartonSpec::new(12, 10, 10).unwrap();
    let with_base = PackerConfig::builder().base_height(6).build();
    let without_base = PackerConfig::builder().base_height(0).build();
    let stack = StackConstraint::new(50).unwrap();
    let a = plan(carton, stack, &with_base).unwrap();
    let b = plan(carton, stack, &without_base).unwrap();
    assert_eq!(a.volume_utilization, b.volume_utilization);
    // 16 per layer, 5 layers, exact fit
    assert_eq!(a.total_cartons, 80);
    assert!((a.volume_utilization - 100.0).abs() < 1e-9);
}

#[test]
fn headroom_counts_as_waste() {
    let carton = CartonSpec::new(12, 10, 10).unwrap();
    let out = plan(carton, StackConstraint::new(59).unwrap(), &PackerConfig::default()).unwrap();
    assert_eq!(out.max_layers, 5);
    assert!((out.volume_utilization - 50.0 / 59.0 * 100.0).abs() < 1e-9);
}

#[test]
fn infeasible_plan_has_zero_totals() {
    let carton = CartonSpec::new(100, 100, 5).unwrap();
    let out = plan(carton, StackConstraint::new(59).unwrap(), &PackerConfig::default()).unwrap();
    assert!(!out.fits());
    assert_eq!(out.total_cartons, 0);
    assert_eq!(out.max_layers, 11);
    assert_eq!(out.area_utilization, 0.0);
    assert_eq!(out.volume_utilization, 0.0);
}

#[test]
fn equal_height_is_allowed() {
    let carton = CartonSpec::new(16, 10, 59).unwrap();
    let out = plan(carton, StackConstraint::new(59).unwrap(), &PackerConfig::default()).unwrap();
    assert_eq!(out.max_layers, 1);
    assert_eq!(out.total_cartons, 12);
}

#[test]
fn too_tall_is_rejected() {
    let carton = CartonSpec::new(16, 10, 60).unwrap();
    let err = plan(carton, StackConstraint::new(59).unwrap(), &PackerConfig::default()).unwrap_err();
    assert!(matches!(err, PalletError::HeightExceedsMax { .. }));
    assert!(err.to_string().contains("exceeds"));
}
