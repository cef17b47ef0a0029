//! Smooth a spectrum that contains flagged pixels.
//!
//! Run with `RUST_LOG=debug` to see the engine diagnostics.

use anyhow::Result;
use lib_convolve::{window_kernel, ConvolveConfig, MaskedArray, MaskedConvolver, WindowType};
use ndarray::Array1;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Emission line on a continuum, with two bad pixels
    let mut flux = Array1::from_shape_fn(40, |i| {
        let d = i as f64 - 20.0;
        50.0 + 400.0 * (-(d * d) / 18.0).exp()
    });
    flux[12] = f64::NAN;
    flux[27] = f64::INFINITY;

    let spectrum = MaskedArray::masked_invalid(flux);
    tracing::info!("{} of {} pixels masked", spectrum.count_masked(), spectrum.len());

    let kernel = window_kernel(WindowType::Gaussian { sigma: 1.0 }, 5)?;
    let engine = MaskedConvolver::new(kernel, ConvolveConfig::default());

    let smoothed = engine.convolve_masked(&spectrum)?;
    let repaired = engine.interpolate_masked(&spectrum)?;

    println!("{:>5} {:>12} {:>12} {:>12}", "pixel", "flux", "smoothed", "repaired");
    for (i, ((f, s), r)) in spectrum
        .data()
        .iter()
        .zip(smoothed.iter())
        .zip(repaired.iter())
        .enumerate()
    {
        println!("{:>5} {:>12.3} {:>12.3} {:>12.3}", i, f, s, r);
    }

    Ok(())
}
