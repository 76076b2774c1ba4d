//! Plotters-powered generation mix bar chart for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::report::{ChartEntry, fuel_rgb};

/// A render-only chart description: one vertical bar per entry, y in percent.
pub struct MixPlottersChart<'a> {
    pub entries: &'a [ChartEntry],
}

impl<'a> Widget for MixPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }
        if self.entries.is_empty() {
            buf.set_string(area.x, area.y, "No generation reported.", Style::default().fg(TuiColor::Gray));
            return;
        }

        let n = self.entries.len() as f64;
        let y_max = self
            .entries
            .iter()
            .map(|e| f64::from(e.percent))
            .fold(10.0_f64, f64::max)
            .min(100.0)
            + 5.0;
        let entries = self.entries;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(0.0..n, 0.0..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(5)
                .y_label_formatter(&|v| format!("{v:.0}%"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(entries.iter().enumerate().map(|(i, e)| {
                let (r, g, b) = fuel_rgb(e.fuel);
                let x0 = i as f64 + 0.15;
                let x1 = i as f64 + 0.85;
                Rectangle::new([(x0, 0.0), (x1, f64::from(e.percent))], RGBColor(r, g, b).filled())
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FuelCategory;

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn bars_are_painted_in_fuel_colors() {
        let entries = [
            ChartEntry { fuel: FuelCategory::Coal, label: "Coal", percent: 60, mw: 6000 },
            ChartEntry { fuel: FuelCategory::Wind, label: "Wind", percent: 40, mw: 4000 },
        ];
        let area = Rect::new(0, 0, 40, 16);
        let mut buf = Buffer::empty(area);
        MixPlottersChart { entries: &entries }.render(area, &mut buf);

        let (r, g, b) = fuel_rgb(FuelCategory::Coal);
        let coal = TuiColor::Rgb(r, g, b);
        assert!(buf.content().iter().any(|c| c.fg == coal || c.bg == coal));
    }

    #[test]
    fn tiny_or_empty_charts_show_a_message() {
        let small = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(small);
        MixPlottersChart { entries: &[] }.render(small, &mut buf);
        assert!(text(&buf).starts_with("Chart area"));

        let area = Rect::new(0, 0, 40, 16);
        let mut buf = Buffer::empty(area);
        MixPlottersChart { entries: &[] }.render(area, &mut buf);
        assert!(text(&buf).starts_with("No generation reported."));
    }
}
