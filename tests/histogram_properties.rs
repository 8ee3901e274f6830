//! Property tests for the binning engine.
//!
//! Run: cargo test --test histogram_properties

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use proptest::prelude::*;
use rangehist::binning::{self, BinEstimator, BinSpec, MAX_AUTO_BINS};
use rangehist::prelude::*;

fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3f64..1.0e3, 1..200)
}

fn estimator() -> impl Strategy<Value = BinEstimator> {
    prop_oneof![
        Just(BinEstimator::Auto),
        Just(BinEstimator::Sturges),
        Just(BinEstimator::Sqrt),
        Just(BinEstimator::Rice),
        Just(BinEstimator::Scott),
        Just(BinEstimator::FreedmanDiaconis),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_explicit_count_over_extent_keeps_every_value(data in values(), n in 1usize..60) {
        let engine = HistogramEngine::new(data.clone(), &HistogramOptions::new().bins(n)).unwrap();

        prop_assert_eq!(engine.bin_count(), n);
        prop_assert_eq!(engine.outlier_table().total(), 0.0);
        prop_assert_eq!(engine.bin_table().total(), data.len() as f64);
    }

    #[test]
    fn prop_counts_plus_outliers_is_dataset_size(
        data in values(),
        low in -1.2e3f64..1.2e3,
        width in 0.1f64..1.0e3,
        n in 1usize..40,
    ) {
        let options = HistogramOptions::new().bins(n).range(low, low + width);
        let engine = HistogramEngine::new(data.clone(), &options).unwrap();

        let total = engine.bin_table().total() + engine.outlier_table().total();
        prop_assert_eq!(total, data.len() as f64);
    }

    #[test]
    fn prop_recompute_is_idempotent(data in values(), spec in estimator()) {
        let mut engine =
            HistogramEngine::new(data, &HistogramOptions::new().bins(spec)).unwrap();
        let bins = engine.bin_table().clone();
        let outliers = *engine.outlier_table();

        engine.recompute_histogram().unwrap();
        prop_assert!(engine.bin_table().bit_eq(&bins));
        prop_assert!(engine.outlier_table().bit_eq(&outliers));
    }

    #[test]
    fn prop_density_has_unit_area(mut data in values(), spec in estimator()) {
        // at least two distinct values
        data.push(data[0] + 1.0);
        let options = HistogramOptions::new().bins(spec).density(true);
        let engine = HistogramEngine::new(data, &options).unwrap();

        let area: f64 = engine.bin_table().rows().iter().map(|r| r.count * r.width).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn prop_outlier_bars_are_flush(
        data in values(),
        low in -800.0f64..0.0,
        width in 1.0f64..800.0,
        n in 1usize..30,
    ) {
        let options = HistogramOptions::new().bins(n).range(low, low + width);
        let engine = HistogramEngine::new(data.clone(), &options).unwrap();
        let edges = engine.bin_edges();
        let out = engine.outlier_table();

        prop_assert_eq!(out.low.right.to_bits(), edges[0].to_bits());
        prop_assert_eq!(out.high.left.to_bits(), edges[edges.len() - 1].to_bits());

        let below: Vec<f64> = data.iter().copied().filter(|&v| v < low).collect();
        if below.is_empty() {
            prop_assert!(out.low.left.is_nan());
        } else {
            let min = below.iter().copied().fold(f64::INFINITY, f64::min);
            prop_assert_eq!(out.low.left, min);
            prop_assert_eq!(out.low.count, below.len() as f64);
        }
    }

    #[test]
    fn prop_edges_strictly_increasing(data in values(), spec in estimator()) {
        let dataset = Dataset::new(data).unwrap();
        let edges =
            binning::bin_edges(dataset.values(), &BinSpec::Auto(spec), dataset.extent()).unwrap();

        prop_assert!(edges.len() >= 2);
        prop_assert!(edges.len() - 1 <= MAX_AUTO_BINS);
        prop_assert!(edges.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_viewport_is_range_plus_one_bin(
        data in values(),
        low in -1.0e3f64..1.0e3,
        width in 0.1f64..1.0e3,
        n in 1usize..12,
    ) {
        let options = HistogramOptions::new().bins(n).range(low, low + width);
        let mut engine = HistogramEngine::new(data, &options).unwrap();
        let (lo, hi) = engine.visible_range();
        let bw = engine.bin_width();

        let vp = engine.viewport();
        prop_assert_eq!((vp.start, vp.end), (lo - bw, hi + bw));

        engine.update_view(ViewRegion::XRange, 0.0, 0).unwrap();
        let (after_lo, after_hi) = engine.visible_range();
        prop_assert!((after_lo - lo).abs() <= 1e-9, "low drifted: {} -> {}", lo, after_lo);
        prop_assert!((after_hi - hi).abs() <= 1e-9, "high drifted: {} -> {}", hi, after_hi);
    }

    #[test]
    fn prop_reset_restores_constructed_range(
        data in values(),
        fraction in -0.2f64..0.5,
        add_bins in -1i32..4,
    ) {
        let mut engine = HistogramEngine::new(data, &HistogramOptions::new().bins(10usize)).unwrap();
        let original = engine.visible_range();

        // a failing narrowing leaves the engine as it was
        let _ = engine.update_view(ViewRegion::XRange, fraction, add_bins);
        engine.update_view(ViewRegion::Reset, 0.0, 0).unwrap();

        prop_assert_eq!(engine.visible_range(), original);
    }
}
