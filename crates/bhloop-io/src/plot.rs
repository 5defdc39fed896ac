//! SVG plots of BH loops.
//!
//! The loop plot overlays the gapped branches (dashed) on the ungapped ones;
//! the averaged plot shows the middle curve of each loop.

use std::path::Path;

use bhloop_core::ModelResult;
use log::info;
use ndarray::Array1;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::export::ExportError;

const PLOT_SIZE: (u32, u32) = (1024, 768);

/// Flux-density axis range covering every curve, with a 5% margin.
pub fn flux_range<'a>(curves: impl IntoIterator<Item = &'a Array1<f64>>) -> (f64, f64) {
    let (lo, hi) = curves
        .into_iter()
        .flat_map(|c| c.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b), hi.max(b))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let margin = if hi > lo { 0.05 * (hi - lo) } else { 1.0 };
    (lo - margin, hi + margin)
}

fn points<'a>(
    field: &'a Array1<f64>,
    flux: &'a Array1<f64>,
) -> impl Iterator<Item = (f64, f64)> + Clone + 'a {
    field.iter().zip(flux.iter()).map(|(&h, &b)| (h, b))
}

/// Save the BH loop (both branches, gapped branches dashed) as SVG.
pub fn save_loop_plot(result: &ModelResult, path: &Path) -> Result<(), ExportError> {
    draw_loop(result, path).map_err(|e| ExportError::Plot(e.to_string()))?;
    info!("BH loop plot written to {}", path.display());
    Ok(())
}

/// Save the averaged BH curve(s) as SVG.
pub fn save_averaged_plot(result: &ModelResult, path: &Path) -> Result<(), ExportError> {
    draw_averaged(result, path).map_err(|e| ExportError::Plot(e.to_string()))?;
    info!("Averaged BH curve plot written to {}", path.display());
    Ok(())
}

fn draw_loop(result: &ModelResult, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let field = &result.field;
    let h_min = field[0];
    let h_max = field[field.len() - 1];

    let mut curves = vec![&result.ungapped.upper, &result.ungapped.lower];
    if let Some(gapped) = &result.gapped {
        curves.push(&gapped.branches.upper);
        curves.push(&gapped.branches.lower);
    }
    let (b_min, b_max) = flux_range(curves);

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("BH-loop: both branches", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(h_min..h_max, b_min..b_max)?;

    chart
        .configure_mesh()
        .x_desc("H (A/m)")
        .y_desc("B (T)")
        .draw()?;

    // B1 in blue, B2 in red
    chart
        .draw_series(LineSeries::new(points(field, &result.ungapped.upper), &BLUE))?
        .label("B1")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(points(field, &result.ungapped.lower), &RED))?
        .label("B2")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    if let Some(gapped) = &result.gapped {
        chart
            .draw_series(DashedLineSeries::new(
                points(field, &gapped.branches.upper),
                10,
                6,
                BLUE.stroke_width(1),
            ))?
            .label("B1 (gapped)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], &BLUE));

        chart
            .draw_series(DashedLineSeries::new(
                points(field, &gapped.branches.lower),
                10,
                6,
                RED.stroke_width(1),
            ))?
            .label("B2 (gapped)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], &RED));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_averaged(result: &ModelResult, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let field = &result.field;
    let h_min = field[0];
    let h_max = field[field.len() - 1];

    let averaged = result.ungapped.averaged();
    let gapped_averaged = result.gapped.as_ref().map(|g| g.branches.averaged());
    let (b_min, b_max) = flux_range(std::iter::once(&averaged).chain(gapped_averaged.as_ref()));

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("BH-curve: averaged branches", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(h_min..h_max, b_min..b_max)?;

    chart
        .configure_mesh()
        .x_desc("H (A/m)")
        .y_desc("B (T)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(points(field, &averaged), &BLUE))?
        .label("Middle curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    if let Some(gapped) = &gapped_averaged {
        chart
            .draw_series(DashedLineSeries::new(
                points(field, gapped),
                10,
                6,
                BLUE.stroke_width(1),
            ))?
            .label("Middle curve (gapped)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], &BLUE));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}
