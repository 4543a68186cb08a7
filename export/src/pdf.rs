//! PDF assembly with `lopdf`.
//!
//! Pages are A4 and set in the built-in Helvetica faces, so no font files
//! are embedded. Layout is a single top-to-bottom flow: title block,
//! sections, table blocks, a visualization block with the charts drawn as
//! vector bars, and a closing page with the footer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use competitor_report_core::{ComparisonTable, Section, SignalField, SignalMap};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, info};

use crate::charts::ChartSpec;
use crate::error::Result;
use crate::text::{encode_win_ansi, text_width, wrap_text};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.5;
const BODY_LEADING: f32 = 14.0;
const CELL_SIZE: f32 = 8.5;
const CELL_LEADING: f32 = 11.0;
const CELL_PADDING: f32 = 4.0;
const CHART_HEIGHT: f32 = 150.0;
const BAR_COLOR: [f32; 3] = [0.30, 0.45, 0.69];

/// A titled grid; the first row is drawn as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub title: String,
    pub grid: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn new(title: impl Into<String>, grid: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            grid,
        }
    }

    /// Strengths / weaknesses / opportunities per domain.
    pub fn comparison(table: &ComparisonTable) -> Self {
        Self::new("Competitor comparison", table.to_grid())
    }

    /// One row of counters and flags per domain.
    pub fn signals(signals: &SignalMap) -> Self {
        let mut grid = vec![
            ["Domain", "Characters", "CTAs", "Trust signals", "Cases", "Reviews", "Certificates"]
                .map(String::from)
                .to_vec(),
        ];
        for (domain, record) in signals {
            let mut row = vec![domain.clone()];
            for field in SignalField::ALL {
                let cell = match (record.count(field), record.flag(field)) {
                    (Some(count), _) => count.to_string(),
                    (None, Some(true)) => "yes".to_string(),
                    _ => "no".to_string(),
                };
                row.push(cell);
            }
            grid.push(row);
        }
        Self::new("Signals by domain", grid)
    }
}

/// Everything that goes into one PDF.
#[derive(Debug, Clone)]
pub struct PdfReport {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub sections: Vec<Section>,
    pub tables: Vec<TableBlock>,
    pub charts: Vec<ChartSpec>,
    pub footer: String,
}

impl PdfReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_at: Local::now(),
            sections: Vec::new(),
            tables: Vec::new(),
            charts: Vec::new(),
            footer: String::new(),
        }
    }
}

/// `<dir>/<prefix>_<YYYY-MM-DD_HH-MM>.pdf`, creating `dir` when missing.
pub fn default_output_path(dir: impl AsRef<Path>, prefix: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M");
    Ok(dir.join(format!("{prefix}_{stamp}.pdf")))
}

/// Lays out `report` and writes it to `path`.
///
/// Returns the written path.
pub fn save_pdf_report(report: &PdfReport, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut layout = Layout::new();

    layout.title_block(report);
    for section in &report.sections {
        layout.section(section);
    }
    for table in &report.tables {
        layout.table(table);
    }
    if !report.charts.is_empty() {
        layout.heading("Visualization");
        for chart in &report.charts {
            layout.chart(chart);
        }
    }
    layout.footer_page(&report.footer);

    let pages = layout.finish();
    let page_count = pages.len();
    let mut doc = build_document(report, pages)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    doc.compress();
    doc.save(path)?;
    info!(path = %path.display(), pages = page_count, "PDF written");
    Ok(path.to_path_buf())
}

fn build_document(report: &PdfReport, pages: Vec<Vec<Operation>>) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH),
                real(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(&report.title), StringFormat::Literal),
        "Producer" => Object::string_literal("competitor-report"),
        "CreationDate" => Object::string_literal(
            report.generated_at.format("D:%Y%m%d%H%M%S").to_string()
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    Ok(doc)
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> Object {
        let name: &[u8] = match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        };
        Object::Name(name.to_vec())
    }
}

fn real(value: f32) -> Object {
    value.into()
}

/// Top-to-bottom flow layout collecting content operations per page.
struct Layout {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(ops);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    fn ensure(&mut self, height: f32) {
        let at_top = self.y >= PAGE_HEIGHT - MARGIN;
        if !at_top && self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.resource(), real(size)]));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn fill_color(&mut self, [r, g, b]: [f32; 3]) {
        self.ops
            .push(Operation::new("rg", vec![real(r), real(g), real(b)]));
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &str) {
        self.ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        self.ops.push(Operation::new(paint, vec![]));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(Operation::new("m", vec![real(x1), real(y1)]));
        self.ops.push(Operation::new("l", vec![real(x2), real(y2)]));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f32, leading: f32) {
        for line in wrap_text(text, size, CONTENT_WIDTH) {
            self.ensure(leading);
            self.y -= leading;
            if !line.is_empty() {
                self.text(MARGIN, self.y, font, size, &line);
            }
        }
    }

    fn heading(&mut self, title: &str) {
        self.ensure(HEADING_SIZE * 2.0 + BODY_LEADING * 2.0);
        self.y -= HEADING_SIZE * 0.8;
        self.paragraph(title, Font::Bold, HEADING_SIZE, HEADING_SIZE + 4.0);
        self.y -= 4.0;
    }

    fn title_block(&mut self, report: &PdfReport) {
        self.paragraph(&report.title, Font::Bold, TITLE_SIZE, TITLE_SIZE + 6.0);
        let stamp = format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M"));
        self.paragraph(&stamp, Font::Regular, BODY_SIZE, BODY_LEADING);
        self.y -= BODY_LEADING;
    }

    fn section(&mut self, section: &Section) {
        self.heading(&section.title);
        self.paragraph(&section.body, Font::Regular, BODY_SIZE, BODY_LEADING);
        self.y -= BODY_LEADING / 2.0;
    }

    fn table(&mut self, table: &TableBlock) {
        let Some(header) = table.grid.first() else {
            return;
        };
        let columns = table.grid.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.heading(&table.title);
        let col_width = CONTENT_WIDTH / columns as f32;
        self.table_row(header, columns, col_width, true);
        for row in &table.grid[1..] {
            let height = row_height(row, col_width);
            if self.y - height < MARGIN {
                self.new_page();
                self.table_row(header, columns, col_width, true);
            }
            self.table_row(row, columns, col_width, false);
        }
        self.y -= BODY_LEADING;
    }

    fn table_row(&mut self, row: &[String], columns: usize, col_width: f32, header: bool) {
        let height = row_height(row, col_width);
        self.ensure(height);
        let top = self.y;
        let bottom = top - height;
        let font = if header { Font::Bold } else { Font::Regular };

        if header {
            self.fill_color([0.88, 0.88, 0.88]);
            self.rect(MARGIN, bottom, CONTENT_WIDTH, height, "f");
            self.fill_color([0.0, 0.0, 0.0]);
        }
        for col in 0..columns {
            let x = MARGIN + col as f32 * col_width;
            self.rect(x, bottom, col_width, height, "S");
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            let lines = wrap_text(cell, CELL_SIZE, col_width - 2.0 * CELL_PADDING);
            for (i, line) in lines.iter().enumerate() {
                let baseline = top - CELL_PADDING - CELL_LEADING * (i as f32 + 1.0) + 2.0;
                self.text(x + CELL_PADDING, baseline, font, CELL_SIZE, line);
            }
        }
        self.y = bottom;
    }

    fn chart(&mut self, chart: &ChartSpec) {
        let block_height = CHART_HEIGHT + 70.0;
        self.ensure(block_height);
        self.y -= 16.0;
        self.text(MARGIN, self.y, Font::Bold, 11.0, &chart.title);
        self.y -= 14.0;
        self.text(MARGIN, self.y, Font::Regular, 8.0, &chart.axis_label);

        let baseline = self.y - 8.0 - CHART_HEIGHT;
        let plot_left = MARGIN + 10.0;
        let plot_width = CONTENT_WIDTH - 10.0;
        self.line(plot_left, baseline, plot_left + plot_width, baseline);
        self.line(plot_left, baseline, plot_left, baseline + CHART_HEIGHT);

        let max = chart.scale_max() as f32;
        let slot = plot_width / chart.bars.len().max(1) as f32;
        let bar_width = slot * 0.6;
        for (i, bar) in chart.bars.iter().enumerate() {
            let height = bar.value as f32 / max * (CHART_HEIGHT - 14.0);
            let x = plot_left + slot * i as f32 + (slot - bar_width) / 2.0;

            self.fill_color(BAR_COLOR);
            self.rect(x, baseline, bar_width, height, "f");
            self.fill_color([0.0, 0.0, 0.0]);

            let value = bar.value.to_string();
            let value_x = x + (bar_width - text_width(&value, 8.0)) / 2.0;
            self.text(value_x, baseline + height + 3.0, Font::Regular, 8.0, &value);

            let label = fit_label(&bar.label, slot - 4.0, 7.5);
            let label_x = x + (bar_width - text_width(&label, 7.5)) / 2.0;
            self.text(label_x, baseline - 11.0, Font::Regular, 7.5, &label);
        }
        self.y = baseline - 24.0;
        debug!(title = %chart.title, bars = chart.bars.len(), "Chart drawn");
    }

    fn footer_page(&mut self, footer: &str) {
        self.new_page();
        if footer.trim().is_empty() {
            return;
        }
        self.y = PAGE_HEIGHT / 2.0 + BODY_LEADING;
        self.paragraph(footer, Font::Regular, BODY_SIZE, BODY_LEADING);
    }

    /// Closes the last page and stamps page numbers.
    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        let total = self.pages.len();
        let mut pages = std::mem::take(&mut self.pages);
        for (i, ops) in pages.iter_mut().enumerate() {
            self.ops = std::mem::take(ops);
            let label = format!("{} / {}", i + 1, total);
            let x = PAGE_WIDTH - MARGIN - text_width(&label, 8.0);
            self.text(x, MARGIN / 2.0, Font::Regular, 8.0, &label);
            *ops = std::mem::take(&mut self.ops);
        }
        pages
    }
}

fn row_height(row: &[String], col_width: f32) -> f32 {
    let lines = row
        .iter()
        .map(|cell| wrap_text(cell, CELL_SIZE, col_width - 2.0 * CELL_PADDING).len())
        .max()
        .unwrap_or(1);
    lines as f32 * CELL_LEADING + 2.0 * CELL_PADDING
}

/// Shortens `label` with a trailing `..` until it fits `width`.
fn fit_label(label: &str, width: f32, size: f32) -> String {
    if text_width(label, size) <= width {
        return label.to_string();
    }
    let mut chars: Vec<char> = label.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "..";
        if text_width(&candidate, size) <= width {
            return candidate;
        }
    }
    String::new()
}
