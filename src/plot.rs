use std::path::Path;

use plotters::prelude::*;

use crate::Spectrum;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("no spectra to plot")]
    Empty,
    #[error("failed to draw the spectra: {0}")]
    Drawing(String),
}
type Result<T> = std::result::Result<T, PlotError>;

fn drawing<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// Maximum number of charts per row
pub const MAX_COLUMNS: usize = 5;

/// Plots the spectra into a grid of charts saved in `filename`
///
/// The charts are titled with the spectra labels.
pub fn plot_grid<P: AsRef<Path>>(spectra: &[Spectrum], filename: P) -> Result<()> {
    let panels: Vec<_> = spectra.iter().map(|s| (s.label.clone(), s)).collect();
    plot_titled_grid(&panels, filename)
}

/// Plots `(title, spectrum)` panels into a grid of charts saved in `filename`
///
/// All the charts share the same axes ranges.
pub fn plot_titled_grid<P: AsRef<Path>>(
    panels: &[(String, &Spectrum)],
    filename: P,
) -> Result<()> {
    if panels.is_empty() {
        return Err(PlotError::Empty);
    }
    let n_cols = panels.len().min(MAX_COLUMNS);
    let n_rows = (panels.len() + n_cols - 1) / n_cols;

    let (x_min, x_max) = panels
        .iter()
        .map(|(_, s)| s.wavelength_range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), (c, d)| {
            (a.min(c), b.max(d))
        });
    let (y_min, y_max) = panels
        .iter()
        .map(|(_, s)| s.amplitude_range())
        .fold((f64::INFINITY, 0f64), |(a, b), (c, d)| (a.min(c), b.max(d)));

    let plot = BitMapBackend::new(filename.as_ref(), (512 * n_cols as u32, 384 * n_rows as u32))
        .into_drawing_area();
    plot.fill(&WHITE).map_err(drawing)?;

    let mut colors = colorous::TABLEAU10.iter().cycle();
    for (area, (title, spectrum)) in plot.split_evenly((n_rows, n_cols)).iter().zip(panels) {
        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 16))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(x_min..x_max, y_min..y_max + 1.)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .x_desc("Wavelength (nm)")
            .y_desc("Amplitude")
            .draw()
            .map_err(drawing)?;
        let color = colors.next().unwrap_or(&colorous::TABLEAU10[0]);
        let rgb = RGBColor(color.r, color.g, color.b);
        chart
            .draw_series(LineSeries::new(
                spectrum
                    .wavelength
                    .iter()
                    .zip(&spectrum.amplitude)
                    .map(|(&x, &y)| (x, y)),
                &rgb,
            ))
            .map_err(drawing)?;
    }
    plot.present().map_err(drawing)?;
    Ok(())
}
