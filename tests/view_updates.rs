//! End-to-end scenarios: construction, view updates and debounced rebinning.
//!
//! Run: cargo test --test view_updates

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use rangehist::prelude::*;

const SCENARIO: [f64; 10] = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 4.0, 4.0];

fn counts(engine: &HistogramEngine) -> Vec<f64> {
    engine.bin_table().rows().iter().map(|r| r.count).collect()
}

#[derive(Clone, Default)]
struct Ticks(Rc<RefCell<Vec<Instant>>>);

impl TickScheduler for Ticks {
    fn request_tick(&mut self, at: Instant) {
        self.0.borrow_mut().push(at);
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn four_bins_over_explicit_range() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();

    assert_eq!(counts(&engine), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(engine.bin_edges(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(engine.outlier_table().total(), 0.0);
}

#[test]
fn high_outlier_spans_to_maximum() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let engine = HistogramEngine::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0], &options).unwrap();

    assert_eq!(engine.bin_table().total(), 5.0);
    let high = engine.outlier_table().high;
    assert_eq!(high.count, 1.0);
    assert_eq!((high.left, high.right), (5.0, 100.0));
    assert_eq!(high.width, 95.0);
    assert_eq!(high.mid, 52.5);
    assert_eq!(engine.outlier_table().low.count, 0.0);
}

#[test]
fn limit_band_pads_derived_range() {
    let data: Vec<f64> = (0..=30).map(f64::from).collect();
    let engine =
        HistogramEngine::new(data, &HistogramOptions::new().limit(10.0, 20.0)).unwrap();

    assert_eq!(engine.visible_range(), (7.5, 22.5));
    assert_eq!(engine.limit(), (10.0, 20.0));
    assert!(engine.show_limits());
}

#[test]
fn table_column_selection_drops_missing_values() {
    let table = Table::new()
        .column("a", &[1.0, f64::NAN, 3.0])
        .column_opt("b", vec![Some(2.0), None, Some(8.0), Some(4.0)]);
    let mut engine =
        HistogramEngine::new(table, &HistogramOptions::new().column("b").bins(3usize)).unwrap();
    assert_eq!(engine.column(), "b");
    assert_eq!(engine.dataset().values(), &[2.0, 8.0, 4.0]);

    engine.set_column("a").unwrap();
    assert_eq!(engine.dataset().len(), 2);
    assert!(matches!(engine.set_column("missing"), Err(Error::InvalidData(_))));
    assert_eq!(engine.column(), "a");
}

#[test]
fn all_missing_is_invalid_data() {
    let result = HistogramEngine::new(vec![f64::NAN, f64::NAN], &HistogramOptions::new());
    assert!(matches!(result, Err(Error::InvalidData(_))));
}

#[test]
fn options_from_yaml() {
    let options = HistogramOptions::parse(
        "range: [1.0, 5.0]\nbins: 4\nstyle:\n  bars:\n    fill: \"#ff0000\"\n",
    )
    .unwrap();
    assert_eq!(options.style.bars.fill, Rgba::RED);

    let engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();
    assert_eq!(counts(&engine), vec![1.0, 2.0, 3.0, 4.0]);
}

// ============================================================================
// View updates
// ============================================================================

#[test]
fn reset_restores_constructed_range_exactly() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();

    engine.update_view(ViewRegion::Limit, 0.5, 0).unwrap();
    engine.update_view(ViewRegion::XRange, 0.0, -1).unwrap();
    engine.set_bin_spec(BinEstimator::Sturges).unwrap();
    engine.set_bin_spec(4usize).unwrap();
    engine.update_view(ViewRegion::Reset, 0.0, 0).unwrap();

    assert_eq!(engine.visible_range(), (1.0, 5.0));
    assert_eq!(counts(&engine), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn region_names_from_host() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();

    engine.update_view("data".into(), 0.0, 0).unwrap();
    assert_eq!(engine.visible_range(), (1.0, 4.0));
    // unknown names fall back to the viewport
    engine.update_view("sideways".into(), 0.0, 0).unwrap();
    let (low, high) = engine.visible_range();
    assert_relative_eq!(low, 1.0, epsilon = 1e-12);
    assert_relative_eq!(high, 4.0, epsilon = 1e-12);
}

#[test]
fn single_bin_view_is_stable_under_repeated_updates() {
    let options = HistogramOptions::new().range(0.0, 4.0).bins(1usize);
    let mut engine = HistogramEngine::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], &options).unwrap();
    let vp = engine.viewport();
    assert_eq!((vp.start, vp.end), (-4.0, 8.0));
    assert_eq!(vp.bounds, (-1.0, 5.0));

    for _ in 0..5 {
        engine.update_view(ViewRegion::XRange, 0.0, 0).unwrap();
    }
    assert_eq!(engine.viewport().start, -4.0);
    let (low, high) = engine.visible_range();
    assert_relative_eq!(low, 0.0, epsilon = 1e-12);
    assert_relative_eq!(high, 4.0, epsilon = 1e-12);
}

#[test]
fn add_bins_widens_by_bin_widths() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();

    engine.update_view(ViewRegion::Reset, 0.0, 2).unwrap();
    assert_eq!(engine.visible_range(), (-1.0, 7.0));
    // the axis follows
    assert_eq!(engine.viewport().start, -3.0);
}

#[test]
fn reversed_view_is_rejected_without_side_effects() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();
    let before = engine.bin_table().clone();

    let result = engine.update_view(ViewRegion::Reset, -0.75, 0);
    assert!(matches!(result, Err(Error::InvalidBinSpec(_))));
    assert_eq!(engine.visible_range(), (1.0, 5.0));
    assert!(engine.bin_table().bit_eq(&before));
}

// ============================================================================
// Debounced viewport notifications
// ============================================================================

#[test]
fn burst_of_viewport_changes_rebins_once() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();
    let ticks = Ticks::default();
    engine.attach_session(Box::new(ticks.clone()));

    let t0 = Instant::now();
    let ms = Duration::from_millis;
    engine.on_viewport_change(ViewportEdge::Start, 0.5, 0.0, t0);
    engine.on_viewport_change(ViewportEdge::Start, 1.0, 0.5, t0 + ms(40));
    engine.on_viewport_change(ViewportEdge::End, 5.0, 6.0, t0 + ms(80));

    assert_eq!(ticks.0.borrow().len(), 3);
    assert_eq!(engine.pending_update(), Some(t0 + ms(180)));
    // nothing moves until the window closes
    assert!(!engine.tick(t0 + ms(150)).unwrap());
    assert_eq!(engine.visible_range(), (1.0, 5.0));

    assert!(engine.tick(t0 + ms(180)).unwrap());
    assert!(!engine.tick(t0 + ms(400)).unwrap());

    // viewport (1, 5) with a one-bin margin of 4/6 on each side
    let (low, high) = engine.visible_range();
    assert_relative_eq!(low, 1.0 + 4.0 / 6.0, epsilon = 1e-12);
    assert_relative_eq!(high, 5.0 - 4.0 / 6.0, epsilon = 1e-12);
}

#[test]
fn notifications_without_session_or_auto_update_are_inert() {
    let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize).auto_update(false);
    let mut engine = HistogramEngine::new(SCENARIO.to_vec(), &options).unwrap();
    let ticks = Ticks::default();
    engine.attach_session(Box::new(ticks.clone()));

    let t0 = Instant::now();
    engine.on_viewport_change(ViewportEdge::End, 4.0, 6.0, t0);
    assert!(ticks.0.borrow().is_empty());
    assert_eq!(engine.viewport().end, 4.0);
    assert!(!engine.tick(t0 + Duration::from_secs(1)).unwrap());

    engine.set_auto_update(true);
    engine.detach_session();
    engine.on_viewport_change(ViewportEdge::End, 5.0, 4.0, t0);
    assert_eq!(engine.pending_update(), None);
}

#[test]
fn chart_renders_after_rebin() {
    let options =
        HistogramOptions::new().range(1.0, 5.0).bins(4usize).dimensions(240, 160);
    let mut chart = HistogramChart::new(SCENARIO.to_vec(), &options).unwrap();
    chart.engine_mut().update_view(ViewRegion::Data, 0.0, 1).unwrap();

    let fb = chart.to_framebuffer().unwrap();
    assert_eq!((fb.width(), fb.height()), (240, 160));
    let svg = chart.to_svg().unwrap().render();
    assert!(svg.matches("<rect").count() >= 5);
}
