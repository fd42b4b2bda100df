//! Places a raised patch into a synthetic ridge field, removes the seam and
//! traces the ridge skeleton of the result.
//!
//! Run with `RUST_LOG=debug cargo run --example ridges` to see each stage.

use terraseam::field::Grid;
use terraseam::math::Offset;
use terraseam::operations::{ExtractFeatures, FeatureParams, PlacePatch, Polarity};
use terraseam::terrain::{to_grayscale, Terrain, WriteAsciiGrid};
use tracing_subscriber::EnvFilter;

#[allow(clippy::cast_precision_loss)]
fn main() -> terraseam::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Two crossing sine ridges.
    let mut field = Grid::from_fn(200, 200, |c| {
        let (x, y) = (c.x as f32 / 200.0, c.y as f32 / 200.0);
        let a = (x * std::f32::consts::TAU).sin();
        let b = ((x + y) * std::f32::consts::PI * 3.0).cos();
        100.0 * a.max(b)
    });

    let patch = Grid::from_fn(40, 40, |c| 150.0 + (c.x - 20).abs() as f32);
    let mask = Grid::from_fn(40, 40, |c| (c.x - 20).pow(2) + (c.y - 20).pow(2) < 400);
    let report = PlacePatch::new(&patch, &mask, Offset::new(80, 60)).execute(&mut field)?;
    println!(
        "seam solve: {} iterations, residual {:.2e}, converged = {}",
        report.iterations, report.residual, report.converged
    );

    for polarity in [Polarity::Ridge, Polarity::Valley] {
        let graph = ExtractFeatures::new(FeatureParams {
            polarity,
            ..FeatureParams::default()
        })
        .execute(&field)?;
        let length: f32 = graph.edges().map(|(_, e)| e.length()).sum();
        println!(
            "{polarity:?}: {} nodes, {} edges, {length:.0} px of skeleton",
            graph.node_count(),
            graph.edge_count()
        );
    }

    let preview = to_grayscale(&field, None);
    let bright = preview.iter().filter(|&&v| v > 200).count();
    println!("{bright} bright pixels in the preview");

    let mut out = Vec::new();
    WriteAsciiGrid::new(&Terrain::new(field, 30.0)).execute(&mut out)?;
    println!("ascii grid: {} bytes", out.len());
    Ok(())
}
