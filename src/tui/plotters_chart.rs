//! Plotters-powered driver bar chart widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

/// Horizontal bars, first entry on top.
///
/// All series data is prepared outside `render()`.
pub struct DriversChart<'a> {
    pub bars: &'a [(String, f64)],
    /// Coefficients can be negative; importances cannot.
    pub signed: bool,
}

impl DriversChart<'_> {
    /// X range covering every bar and zero, padded slightly.
    pub fn x_bounds(&self) -> [f64; 2] {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for (_, v) in self.bars {
            if v.is_finite() {
                lo = lo.min(*v);
                hi = hi.max(*v);
            }
        }
        if hi - lo <= 1e-12 {
            hi = lo + 1.0;
        }
        let pad = (hi - lo) * 0.05;
        [if lo < 0.0 { lo - pad } else { lo }, hi + pad]
    }

    /// Solid fill for one bar: red raises risk, green lowers it.
    fn bar_style(&self, value: f64) -> ShapeStyle {
        let color = match (self.signed, value >= 0.0) {
            (false, _) => RGBColor(0, 255, 255),
            (true, true) => RGBColor(255, 80, 80),
            (true, false) => RGBColor(0, 200, 120),
        };
        color.filled()
    }
}

impl Widget for DriversChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }
        if self.bars.is_empty() {
            return;
        }

        let [x0, x1] = self.x_bounds();
        let n = self.bars.len() as f64;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, 0.0..n)?;

            // Names are listed beside the chart; only the value axis is labelled.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_labels(0)
                .x_labels(5)
                .x_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(self.bars.iter().enumerate().map(|(i, (_, v))| {
                let top = n - i as f64 - 0.15;
                let bottom = n - i as f64 - 0.85;
                Rectangle::new([(0.0, bottom), (*v, top)], self.bar_style(*v))
            }))?;

            if self.signed {
                chart.draw_series(LineSeries::new([(0.0, 0.0), (0.0, n)], &WHITE))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_zero_and_negative_bars() {
        let bars = vec![("a".to_string(), 0.5), ("b".to_string(), -1.0)];
        let chart = DriversChart { bars: &bars, signed: true };
        let [lo, hi] = chart.x_bounds();
        assert!(lo < -1.0);
        assert!(hi > 0.5);
    }

    #[test]
    fn importance_bounds_start_at_zero() {
        let bars = vec![("a".to_string(), 0.6), ("b".to_string(), 0.3)];
        let chart = DriversChart { bars: &bars, signed: false };
        assert_eq!(chart.x_bounds()[0], 0.0);
    }

    #[test]
    fn bars_are_filled_and_coloured_by_sign() {
        let chart = DriversChart { bars: &[], signed: true };
        let up = chart.bar_style(0.4);
        let down = chart.bar_style(-0.4);
        assert!(up.filled && down.filled);
        assert_eq!(up.color, RGBColor(255, 80, 80).to_rgba());
        assert_eq!(down.color, RGBColor(0, 200, 120).to_rgba());

        let unsigned = DriversChart { bars: &[], signed: false };
        assert_eq!(unsigned.bar_style(-0.4).color, RGBColor(0, 255, 255).to_rgba());
    }

    #[test]
    fn empty_bars_get_a_unit_range() {
        let chart = DriversChart { bars: &[], signed: false };
        let [lo, hi] = chart.x_bounds();
        assert_eq!(lo, 0.0);
        assert!(hi >= 1.0);
    }
}
