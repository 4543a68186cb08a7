//! Bar charts of the per-domain signal counters.
//!
//! [`ChartSpec`] is the drawing-independent model: one bar per domain, in
//! signal map order. It is rendered to standalone SVG files here and drawn
//! natively by the PDF assembler.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use competitor_report_core::{SignalField, SignalMap};
use tracing::{debug, info};

use crate::error::Result;

const SVG_WIDTH: f64 = 720.0;
const SVG_HEIGHT: f64 = 420.0;
const PLOT_LEFT: f64 = 80.0;
const PLOT_RIGHT: f64 = 24.0;
const PLOT_TOP: f64 = 56.0;
const PLOT_BOTTOM: f64 = 90.0;
const BAR_FILL: &str = "#4c72b0";

/// Which counter a chart shows and how it is labelled.
struct Metric {
    field: SignalField,
    file_name: &'static str,
    title: &'static str,
    axis_label: &'static str,
}

const METRICS: [Metric; 3] = [
    Metric {
        field: SignalField::TextSize,
        file_name: "text_size.svg",
        title: "Text volume by domain",
        axis_label: "Characters",
    },
    Metric {
        field: SignalField::Ctas,
        file_name: "ctas.svg",
        title: "CTA count by domain",
        axis_label: "CTAs",
    },
    Metric {
        field: SignalField::TrustSignals,
        file_name: "trust_signals.svg",
        title: "Trust signals by domain",
        axis_label: "Signals",
    },
];

/// One labelled bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

/// A bar chart ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub file_name: String,
    pub title: String,
    pub axis_label: String,
    pub bars: Vec<Bar>,
}

impl ChartSpec {
    /// Builds the text size, CTA and trust signal charts.
    ///
    /// Returns no charts for an empty map. Domains whose counter is zero keep
    /// a zero-height bar.
    pub fn from_signals(signals: &SignalMap) -> Vec<ChartSpec> {
        if signals.is_empty() {
            return Vec::new();
        }
        METRICS
            .iter()
            .map(|metric| ChartSpec {
                file_name: metric.file_name.to_string(),
                title: metric.title.to_string(),
                axis_label: metric.axis_label.to_string(),
                bars: signals
                    .iter()
                    .map(|(domain, record)| Bar {
                        label: domain.clone(),
                        value: record.count(metric.field).unwrap_or(0),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Largest bar value, at least 1 so scaling never divides by zero.
    pub fn scale_max(&self) -> u64 {
        self.bars.iter().map(|b| b.value).max().unwrap_or(0).max(1)
    }

    /// Renders the chart as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let plot_width = SVG_WIDTH - PLOT_LEFT - PLOT_RIGHT;
        let plot_height = SVG_HEIGHT - PLOT_TOP - PLOT_BOTTOM;
        let baseline = PLOT_TOP + plot_height;
        let max = self.scale_max() as f64;
        let slot = plot_width / self.bars.len().max(1) as f64;
        let bar_width = slot * 0.6;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SVG_WIDTH}" height="{SVG_HEIGHT}" viewBox="0 0 {SVG_WIDTH} {SVG_HEIGHT}" font-family="Helvetica, Arial, sans-serif">"#
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="{SVG_WIDTH}" height="{SVG_HEIGHT}" fill="white"/>"#
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="32" font-size="18" text-anchor="middle">{}</text>"#,
            SVG_WIDTH / 2.0,
            escape_xml(&self.title)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="22" y="{:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 22 {:.1})">{}</text>"#,
            PLOT_TOP + plot_height / 2.0,
            PLOT_TOP + plot_height / 2.0,
            escape_xml(&self.axis_label)
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{PLOT_LEFT}" y1="{baseline:.1}" x2="{:.1}" y2="{baseline:.1}" stroke="black"/>"#,
            SVG_WIDTH - PLOT_RIGHT
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{PLOT_LEFT}" y1="{PLOT_TOP}" x2="{PLOT_LEFT}" y2="{baseline:.1}" stroke="black"/>"#
        );

        for (i, bar) in self.bars.iter().enumerate() {
            let height = bar.value as f64 / max * plot_height;
            let x = PLOT_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
            let center = x + bar_width / 2.0;
            let _ = writeln!(
                svg,
                r#"  <rect class="bar" x="{x:.1}" y="{:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{BAR_FILL}"/>"#,
                baseline - height
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{center:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
                baseline - height - 6.0,
                bar.value
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{center:.1}" y="{:.1}" font-size="11" text-anchor="end" transform="rotate(-30 {center:.1} {:.1})">{}</text>"#,
                baseline + 18.0,
                baseline + 18.0,
                escape_xml(&bar.label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Writes one SVG per chart into `out_dir`, creating it when missing.
///
/// Returns the written paths in chart order; nothing is written for an empty
/// signal map.
pub fn build_charts(signals: &SignalMap, out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let specs = ChartSpec::from_signals(signals);
    if specs.is_empty() {
        debug!("No signals, skipping charts");
        return Ok(Vec::new());
    }

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let mut paths = Vec::with_capacity(specs.len());
    for spec in &specs {
        let path = out_dir.join(&spec.file_name);
        fs::write(&path, spec.to_svg())?;
        paths.push(path);
    }
    info!(count = paths.len(), dir = %out_dir.display(), "Charts written");
    Ok(paths)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use competitor_report_core::SignalRecord;

    fn signals() -> SignalMap {
        let mut map = SignalMap::new();
        map.insert(
            "alpha.example".to_string(),
            SignalRecord {
                text_size: 8000,
                ctas: 3,
                trust_signals: 5,
                ..SignalRecord::default()
            },
        );
        map.insert("beta.example".to_string(), SignalRecord::default());
        map
    }

    #[test]
    fn test_empty_map_has_no_charts() {
        assert!(ChartSpec::from_signals(&SignalMap::new()).is_empty());
    }

    #[test]
    fn test_specs_follow_map_order_and_keep_zero_bars() {
        let specs = ChartSpec::from_signals(&signals());
        let names: Vec<&str> = specs.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(names, ["text_size.svg", "ctas.svg", "trust_signals.svg"]);

        let ctas = &specs[1];
        assert_eq!(ctas.title, "CTA count by domain");
        assert_eq!(ctas.axis_label, "CTAs");
        assert_eq!(
            ctas.bars,
            [
                Bar { label: "alpha.example".to_string(), value: 3 },
                Bar { label: "beta.example".to_string(), value: 0 },
            ]
        );
    }

    #[test]
    fn test_all_zero_chart_scales_safely() {
        let mut map = SignalMap::new();
        map.insert("zero.example".to_string(), SignalRecord::default());
        let spec = &ChartSpec::from_signals(&map)[0];
        assert_eq!(spec.scale_max(), 1);
        let svg = spec.to_svg();
        assert!(svg.contains(r#"height="0.0""#));
    }

    #[test]
    fn test_svg_has_one_bar_per_domain_with_labels() {
        let svg = ChartSpec::from_signals(&signals())[0].to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains(">Text volume by domain<"));
        assert!(svg.contains(">Characters<"));
        assert!(svg.contains(">8000<"));
        assert!(svg.contains(">beta.example<"));
    }

    #[test]
    fn test_labels_are_escaped() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_build_charts_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let paths = build_charts(&signals(), &out).unwrap();
        assert_eq!(paths.len(), 3);
        for path in &paths {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"));
        }
        assert_eq!(paths[2], out.join("trust_signals.svg"));
    }

    #[test]
    fn test_build_charts_empty_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        assert!(build_charts(&SignalMap::new(), &out).unwrap().is_empty());
        assert!(!out.exists());
    }
}
