//! Two-panel SVG chart: price and VWAP lines above, volume bars below.
//!
//! Missing VWAP or price values break the line instead of being drawn at
//! zero.

use std::path::Path;

use tracing::info;
use vwap_core::config::ChartConfig;
use vwap_core::{HourBucket, Result};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 130.0;
/// Vertical gap between the two panels.
const PANEL_GAP: f64 = 40.0;
/// Share of the plot height taken by the price panel.
const PRICE_PANEL_SHARE: f64 = 0.7;
const PRICE_TICKS: usize = 5;

const PRICE_COLOR: &str = "#1f4e9c";
const VWAP_COLOR: &str = "#c0392b";
const VOLUME_COLOR: &str = "#000000";

/// A vertical screen band that a panel maps values into.
#[derive(Debug, Clone, Copy)]
struct Panel {
    top: f64,
    height: f64,
    min: f64,
    max: f64,
}

impl Panel {
    fn y(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        let frac = if span > 0.0 { (value - self.min) / span } else { 0.5 };
        self.top + self.height * (1.0 - frac)
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// SVG renderer for an hourly bucket table.
#[derive(Debug, Clone)]
pub struct SvgChart {
    width: u32,
    height: u32,
}

impl SvgChart {
    /// Create a renderer with the given canvas size in pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a renderer from chart configuration.
    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Render the table to an SVG document.
    pub fn render(&self, title: &str, table: &[(String, HourBucket)]) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let mut svg = String::with_capacity(4096 + table.len() * 512);

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
        ));
        svg.push('\n');
        svg.push_str(&format!(
            "<rect width=\"{w}\" height=\"{h}\" fill=\"#ffffff\"/>\n"
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"28\" font-size=\"18\" text-anchor=\"middle\">{}</text>\n",
            w / 2.0,
            escape(title)
        ));

        if table.is_empty() {
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\" text-anchor=\"middle\" fill=\"#666666\">No trades to display</text>\n",
                w / 2.0,
                h / 2.0
            ));
            svg.push_str("</svg>\n");
            return svg;
        }

        let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM - PANEL_GAP).max(2.0);
        let step = plot_w / table.len() as f64;
        let x_at = |i: usize| MARGIN_LEFT + (i as f64 + 0.5) * step;

        // Non-finite values are drawn as gaps, same as missing ones.
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        let prices: Vec<Option<f64>> = table.iter().map(|(_, b)| finite(b.last_price)).collect();
        let vwaps: Vec<Option<f64>> = table.iter().map(|(_, b)| finite(b.vwap)).collect();

        let (min, max) = price_range(prices.iter().chain(vwaps.iter()).flatten().copied());
        let price_panel = Panel {
            top: MARGIN_TOP,
            height: plot_h * PRICE_PANEL_SHARE,
            min,
            max,
        };
        let max_volume = table
            .iter()
            .map(|(_, b)| b.volume_sum)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let volume_panel = Panel {
            top: price_panel.bottom() + PANEL_GAP,
            height: plot_h * (1.0 - PRICE_PANEL_SHARE),
            min: 0.0,
            max: max_volume,
        };

        // Price panel frame and axis.
        self.frame(&mut svg, &price_panel, plot_w);
        for k in 0..=PRICE_TICKS {
            let value = min + (max - min) * k as f64 / PRICE_TICKS as f64;
            let y = price_panel.y(value);
            svg.push_str(&format!(
                "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e0e0e0\"/>\n",
                MARGIN_LEFT + plot_w
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">${value:.2}</text>\n",
                MARGIN_LEFT - 6.0,
                y + 4.0
            ));
        }

        // VWAP first so price markers sit on top.
        for segment in segments(&vwaps) {
            draw_series(&mut svg, &segment, &x_at, &price_panel, VWAP_COLOR, Some("2,4"), "vwap");
        }
        for segment in segments(&prices) {
            draw_series(&mut svg, &segment, &x_at, &price_panel, PRICE_COLOR, None, "price");
            for &(i, value) in &segment {
                svg.push_str(&format!(
                    "<circle class=\"price-marker\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{PRICE_COLOR}\"/>\n",
                    x_at(i),
                    price_panel.y(value)
                ));
            }
        }
        self.legend(&mut svg, plot_w);

        // Volume panel.
        self.frame(&mut svg, &volume_panel, plot_w);
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"middle\">Volume</text>\n",
            MARGIN_LEFT + plot_w / 2.0,
            volume_panel.top - 8.0
        ));
        let bar_w = (step * 0.8).max(1.0);
        for (i, (_, bucket)) in table.iter().enumerate() {
            let top = if max_volume > 0.0 {
                volume_panel.y(bucket.volume_sum.max(0.0).min(max_volume))
            } else {
                volume_panel.bottom()
            };
            svg.push_str(&format!(
                "<rect class=\"volume\" x=\"{:.1}\" y=\"{top:.1}\" width=\"{bar_w:.1}\" height=\"{:.1}\" fill=\"{VOLUME_COLOR}\"/>\n",
                x_at(i) - bar_w / 2.0,
                volume_panel.bottom() - top
            ));
        }

        // Hour labels, rotated under the volume panel.
        let label_y = volume_panel.bottom() + 8.0;
        for (i, (label, _)) in table.iter().enumerate() {
            let x = x_at(i);
            svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{label_y:.1}\" font-size=\"10\" text-anchor=\"end\" transform=\"rotate(-90 {x:.1} {label_y:.1})\">{}</text>\n",
                escape(label)
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Render and write the chart to `path`.
    pub fn write_to(
        &self,
        path: impl AsRef<Path>,
        title: &str,
        table: &[(String, HourBucket)],
    ) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render(title, table))?;
        info!(path = %path.display(), buckets = table.len(), "chart written");
        Ok(())
    }

    fn frame(&self, svg: &mut String, panel: &Panel, plot_w: f64) {
        svg.push_str(&format!(
            "<rect x=\"{MARGIN_LEFT:.1}\" y=\"{:.1}\" width=\"{plot_w:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#999999\"/>\n",
            panel.top, panel.height
        ));
    }

    fn legend(&self, svg: &mut String, plot_w: f64) {
        let x = MARGIN_LEFT + plot_w - 150.0;
        let y = MARGIN_TOP + 18.0;
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{PRICE_COLOR}\" stroke-width=\"2\"/>\n",
            x + 24.0
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">Price (USD)</text>\n",
            x + 30.0,
            y + 4.0
        ));
        let y = y + 18.0;
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{VWAP_COLOR}\" stroke-width=\"2\" stroke-dasharray=\"2,4\"/>\n",
            x + 24.0
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">VWAP</text>\n",
            x + 30.0,
            y + 4.0
        ));
    }
}

/// Split a series into runs of consecutive present values.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn draw_series(
    svg: &mut String,
    segment: &[(usize, f64)],
    x_at: &dyn Fn(usize) -> f64,
    panel: &Panel,
    color: &str,
    dash: Option<&str>,
    class: &str,
) {
    let dash = dash
        .map(|d| format!(" stroke-dasharray=\"{d}\""))
        .unwrap_or_default();

    if let [(i, value)] = segment {
        // A lone point has no line to draw.
        svg.push_str(&format!(
            "<circle class=\"{class}\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"2\" fill=\"{color}\"/>\n",
            x_at(*i),
            panel.y(*value)
        ));
        return;
    }

    let points: Vec<String> = segment
        .iter()
        .map(|&(i, value)| format!("{:.1},{:.1}", x_at(i), panel.y(value)))
        .collect();
    svg.push_str(&format!(
        "<polyline class=\"{class}\" points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"{dash}/>\n",
        points.join(" ")
    ));
}

/// Padded min/max of the plotted prices. Non-finite values are skipped.
fn price_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.filter(|v| v.is_finite()).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        (min.abs() * 0.01).max(1.0)
    };
    (min - pad, max + pad)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
