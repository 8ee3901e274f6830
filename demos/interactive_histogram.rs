//! Interactive histogram walkthrough.
//!
//! Builds a chart over a skewed sample with a limit band, simulates a host
//! panning and zooming the viewport, lets the debounced rebin fire, and writes
//! each state to PNG and SVG.
//!
//! Run with: RUST_LOG=rangehist=debug cargo run --example interactive_histogram

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rangehist::prelude::*;
use tracing_subscriber::EnvFilter;

/// Host that records the latest requested tick.
#[derive(Clone, Default)]
struct Host {
    next_tick: Rc<RefCell<Option<Instant>>>,
}

impl TickScheduler for Host {
    fn request_tick(&mut self, at: Instant) {
        *self.next_tick.borrow_mut() = Some(at);
    }
}

/// Deterministic right-skewed sample with a few far outliers.
fn sample() -> Vec<f64> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut values: Vec<f64> = (0..2000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state >> 11) as f64 / (1u64 << 53) as f64;
            20.0 - 6.0 * (1.0 - u).ln()
        })
        .collect();
    values.extend([-40.0, 140.0, 155.0]);
    values
}

fn report(label: &str, chart: &HistogramChart) {
    let engine = chart.engine();
    let outliers = engine.outlier_table();
    println!(
        "{label:>8}: range ({:.2}, {:.2}), {} bins, outliers {}/{}",
        engine.visible_range().0,
        engine.visible_range().1,
        engine.bin_count(),
        outliers.low.count,
        outliers.high.count,
    );
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let table = Table::new().column("latency_ms", &sample());
    let options = HistogramOptions::new()
        .column("latency_ms")
        .bins(BinEstimator::FreedmanDiaconis)
        .limit(20.0, 45.0)
        .dimensions(800, 400);

    let mut chart = HistogramChart::new(table, &options)?.details(true);
    report("initial", &chart);
    chart.write_png("histogram_initial.png")?;

    let host = Host::default();
    chart.engine_mut().attach_session(Box::new(host.clone()));

    // a drag: several viewport notifications inside the quiet window
    let start = Instant::now();
    let viewport = chart.engine().viewport();
    for step in 1..=5 {
        let now = start + Duration::from_millis(step * 20);
        let (lo, hi) = viewport.panned(step as f64 * 2.0);
        chart.engine_mut().move_viewport(lo, hi, now);
    }

    // the host ticks until the coalesced update runs
    let mut now = start;
    while !chart.engine_mut().tick(now)? {
        now += Duration::from_millis(10);
    }
    let requested = host.next_tick.borrow().map(|t| t - start);
    println!("rebinned after {:?} (requested {requested:?})", now - start);
    report("panned", &chart);
    chart.write_png("histogram_panned.png")?;

    chart.engine_mut().update_view(ViewRegion::Limit, 0.0, 2)?;
    report("limit", &chart);

    chart.engine_mut().update_view(ViewRegion::Reset, 0.0, 0)?;
    report("reset", &chart);
    chart.write_svg("histogram_reset.svg")?;
    chart.to_raster_svg()?.write_to_file("histogram_reset_raster.svg")?;

    println!(
        "wrote histogram_initial.png, histogram_panned.png, histogram_reset.svg, \
         histogram_reset_raster.svg"
    );
    Ok(())
}
