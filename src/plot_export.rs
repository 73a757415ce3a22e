use crate::sample::Sample;
use crate::selection::Selection;
use crate::stats::LinReg;
use crate::utils::padded_range;

use plotters::prelude::*;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 600;

/// Renders a confirmed sample to `stiffness_<id>.png`: the full curve, the
/// selected band and the fitted line over it.
pub fn draw_sample_plot(
    sample: &Sample,
    model: &LinReg,
    selection: Selection,
    out_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(plot_filename(&sample.id));

    let data: Vec<(f64, f64)> =
        sample.deflection.iter().zip(sample.force.iter()).map(|(&d, &f)| (d, f)).collect();

    let (xmin, xmax) = padded_range(sample.min_deflection(), sample.max_deflection(), 0.05);
    let (ymin, ymax) = padded_range(sample.min_force(), sample.max_force(), 0.05);

    let band_x0 = sample.deflection[selection.start_idx];
    let band_x1 = sample.deflection[selection.end_idx - 1];

    let root_area = BitMapBackend::new(&path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root_area)
        .caption(&sample.id, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(xmin..xmax, ymin..ymax)?;

    ctx.configure_mesh().x_desc("Deflection (mm)").y_desc("Force (N)").draw()?;

    let band_style = ShapeStyle { color: BLUE.mix(0.15), filled: true, stroke_width: 0 };
    ctx.draw_series(std::iter::once(Rectangle::new(
        [(band_x0, ymin), (band_x1, ymax)],
        band_style,
    )))?;

    let pt_col = RGBColor(40, 110, 200);
    ctx.draw_series(data.iter().map(|point| Cross::new(*point, 2, pt_col.mix(0.6))))?;

    let fit_line =
        vec![(band_x0, model.calculate(band_x0)), (band_x1, model.calculate(band_x1))];
    let line_style = ShapeStyle { color: RED.mix(1.0), filled: false, stroke_width: 2 };
    ctx.draw_series(std::iter::once(PathElement::new(fit_line, line_style)))?;

    root_area.present()?;
    Ok(path)
}

pub fn plot_filename(sample_id: &str) -> String {
    let safe: String =
        sample_id.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect();
    format!("stiffness_{}.png", safe)
}

#[cfg(test)]
mod tests {
    use super::plot_filename;

    #[test]
    fn test_plot_filename_templated_on_id() {
        assert_eq!(plot_filename("A1"), "stiffness_A1.png");
    }

    #[test]
    fn test_plot_filename_strips_unsafe_chars() {
        assert_eq!(plot_filename("A 1/\\x"), "stiffness_A1x.png");
    }
}
