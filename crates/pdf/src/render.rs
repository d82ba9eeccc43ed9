//! Flow layout of report blocks onto PDF pages.
//!
//! Blocks are placed top to bottom; anything that does not fit on the
//! current page moves to the next one. Tables are split row by row, and
//! every page a table touches starts with its header band. A
//! "Page N of M" footer is added once all pages are known.

use crate::config::RenderConfig;
use crate::error::Result;
use crate::layout::TableBlock;
use crate::text::{encode_win_ansi, text_width, wrap_text, Font};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const DARK_BLUE: Rgb = Rgb(0.0, 0.0, 0.545);
const LIGHT_BLUE: Rgb = Rgb(0.678, 0.847, 0.902);
const LIGHT_GREY: Rgb = Rgb(0.827, 0.827, 0.827);
const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
const ERROR_RED: Rgb = Rgb(0.7, 0.0, 0.0);

const LINE_HEIGHT: f32 = 1.2;
const GRID_LINE_WIDTH: f32 = 0.5;
const FOOTER_FONT_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb(f32, f32, f32);

/// Paragraph styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    Error,
}

/// A unit of document content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Centered document title
    Title(String),
    /// Boxed sheet heading
    Heading(String),
    /// Smaller bold heading, e.g. "Notes:"
    Subheading(String),
    Paragraph(String, TextStyle),
    Bullet(String),
    Table(TableBlock),
    Spacer(f32),
    PageBreak,
}

/// Renders blocks into a PDF byte stream
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    config: RenderConfig,
}

impl PdfRenderer {
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Lay out `blocks` and serialize the document.
    ///
    /// # Errors
    ///
    /// Returns an error for unusable page geometry or if lopdf fails to
    /// encode the content streams.
    pub fn render(&self, title: &str, blocks: &[Block]) -> Result<Vec<u8>> {
        self.config.validate()?;

        let mut flow = Flow::new(&self.config);
        for block in blocks {
            flow.place(block);
        }
        let mut pages = flow.finish();

        let total = pages.len();
        for (index, ops) in pages.iter_mut().enumerate() {
            footer(&self.config, ops, index + 1, total);
        }

        tracing::debug!(pages = total, "laid out document");
        write_document(&self.config, title, pages)
    }
}

/// Cursor state while placing blocks
struct Flow<'a> {
    config: &'a RenderConfig,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
    /// Nothing placed on the current page yet
    fresh: bool,
}

impl<'a> Flow<'a> {
    fn new(config: &'a RenderConfig) -> Self {
        let mut flow = Flow {
            config,
            pages: Vec::new(),
            current: Vec::new(),
            y: 0.0,
            fresh: true,
        };
        flow.y = flow.top();
        flow
    }

    fn top(&self) -> f32 {
        self.config.page_dimensions().1 - self.config.margin_top
    }

    fn bottom(&self) -> f32 {
        self.config.margin_bottom
    }

    fn left(&self) -> f32 {
        self.config.margin_left
    }

    fn width(&self) -> f32 {
        self.config.content_width()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.top();
        self.fresh = true;
    }

    /// Start a new page unless `height` still fits (or the page is empty).
    fn ensure(&mut self, height: f32) {
        if !self.fresh && self.y - height < self.bottom() {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.fresh || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.pages
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Title(text) => self.title(text),
            Block::Heading(text) => self.heading(text),
            Block::Subheading(text) => {
                let size = self.config.body_font_size + 2.0;
                self.ensure(size * LINE_HEIGHT * 2.0);
                self.lines(&[text.clone()], Font::Bold, size, BLACK);
                self.y -= size * 0.4;
            }
            Block::Paragraph(text, style) => self.paragraph(text, *style),
            Block::Bullet(text) => self.paragraph(&format!("\u{2022} {text}"), TextStyle::Normal),
            Block::Table(table) => self.table(table),
            Block::Spacer(height) => {
                self.y -= *height;
                if self.y < self.bottom() {
                    self.new_page();
                }
            }
            Block::PageBreak => {
                if !self.fresh {
                    self.new_page();
                }
            }
        }
    }

    fn title(&mut self, text: &str) {
        let size = self.config.title_font_size;
        let lines = wrap_text(text, Font::Bold, size, self.width());
        self.ensure(lines.len() as f32 * size * LINE_HEIGHT);
        for line in lines {
            let line_width = text_width(&line, Font::Bold, size);
            let x = self.left() + (self.width() - line_width).max(0.0) / 2.0;
            self.y -= size * LINE_HEIGHT;
            let baseline = self.y + size * 0.2;
            show_text(&mut self.current, x, baseline, Font::Bold, size, DARK_BLUE, &line);
        }
        self.y -= size * 0.75;
        self.fresh = false;
    }

    fn heading(&mut self, text: &str) {
        let size = self.config.heading_font_size;
        let padding = 6.0;
        let box_height = size * LINE_HEIGHT + 2.0 * padding;
        let space_before = 12.0;
        // keep the heading together with the start of what follows
        let keep_with = self.config.table_header_font_size * 6.0;
        self.ensure(space_before + box_height + keep_with);
        if !self.fresh {
            self.y -= space_before;
        }

        let (left, width) = (self.left(), self.width());
        let bottom = self.y - box_height;
        fill_rect(&mut self.current, left, bottom, width, box_height, None, Some(GREY));
        let label = clip_to_width(text, Font::Bold, size, width - 2.0 * padding);
        let baseline = bottom + padding + size * 0.25;
        show_text(&mut self.current, left + padding, baseline, Font::Bold, size, DARK_BLUE, &label);
        self.y = bottom - 8.0;
        self.fresh = false;
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let size = self.config.body_font_size;
        let (font, color) = match style {
            TextStyle::Normal => (Font::Regular, BLACK),
            TextStyle::Error => (Font::Bold, ERROR_RED),
        };
        let lines = wrap_text(text, font, size, self.width());
        self.lines(&lines, font, size, color);
    }

    fn lines(&mut self, lines: &[String], font: Font, size: f32, color: Rgb) {
        let line_height = size * LINE_HEIGHT;
        let left = self.left();
        for line in lines {
            self.ensure(line_height);
            self.y -= line_height;
            show_text(&mut self.current, left, self.y + size * 0.2, font, size, color, line);
            self.fresh = false;
        }
    }

    fn table(&mut self, table: &TableBlock) {
        if table.header.is_empty() {
            if let Some(message) = &table.placeholder {
                self.paragraph(message, TextStyle::Normal);
            }
            return;
        }

        let widths = fit_widths(&table.column_widths, self.width());
        let padding = self.config.cell_padding;
        let header_size = self.config.table_header_font_size;
        let body_size = self.config.table_font_size;
        let header_height = header_size * LINE_HEIGHT + 2.0 * padding;
        let row_height = body_size * LINE_HEIGHT + 2.0 * padding;
        let after_header = if table.rows.is_empty() {
            self.config.body_font_size * LINE_HEIGHT
        } else {
            row_height
        };

        // never leave a header band alone at the bottom of a page
        self.ensure(header_height + after_header);
        self.header_band(&table.header, &widths, header_height);

        for (index, row) in table.rows.iter().enumerate() {
            if self.y - row_height < self.bottom() {
                self.new_page();
                if table.repeat_header {
                    self.header_band(&table.header, &widths, header_height);
                }
            }
            let background = (index % 2 == 1).then_some(LIGHT_GREY);
            self.table_row(row, &widths, row_height, Font::Regular, body_size, background);
        }

        if table.rows.is_empty() {
            if let Some(message) = &table.placeholder {
                self.y -= 4.0;
                self.paragraph(message, TextStyle::Normal);
            }
        }
    }

    fn header_band(&mut self, header: &[String], widths: &[f32], height: f32) {
        let size = self.config.table_header_font_size;
        self.table_row(header, widths, height, Font::Bold, size, Some(LIGHT_BLUE));
    }

    fn table_row(
        &mut self,
        cells: &[String],
        widths: &[f32],
        height: f32,
        font: Font,
        size: f32,
        background: Option<Rgb>,
    ) {
        let padding = self.config.cell_padding;
        let left = self.left();
        let bottom = self.y - height;
        let total: f32 = widths.iter().sum();

        if let Some(color) = background {
            fill_rect(&mut self.current, left, bottom, total, height, Some(color), None);
        }

        let mut x = left;
        for (cell, &width) in cells.iter().zip(widths) {
            self.current.push(Operation::new("q", vec![]));
            self.current.push(Operation::new("re", rect_operands(x, bottom, width, height)));
            self.current.push(Operation::new("W", vec![]));
            self.current.push(Operation::new("n", vec![]));
            let baseline = bottom + padding + size * 0.25;
            show_text(&mut self.current, x + padding, baseline, font, size, BLACK, cell);
            self.current.push(Operation::new("Q", vec![]));

            fill_rect(&mut self.current, x, bottom, width, height, None, Some(BLACK));
            x += width;
        }

        self.y = bottom;
        self.fresh = false;
    }
}

/// Scale column widths down proportionally when they overflow the page.
fn fit_widths(widths: &[f32], available: f32) -> Vec<f32> {
    let total: f32 = widths.iter().sum();
    if total <= available || total <= 0.0 {
        return widths.to_vec();
    }
    let scale = available / total;
    widths.iter().map(|w| w * scale).collect()
}

fn clip_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let mut clipped: String = text.to_string();
    while !clipped.is_empty() && text_width(&format!("{clipped}..."), font, size) > max_width {
        clipped.pop();
    }
    format!("{clipped}...")
}

fn rect_operands(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![x.into(), y.into(), width.into(), height.into()]
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![color.0.into(), color.1.into(), color.2.into()]
}

fn fill_rect(
    ops: &mut Vec<Operation>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    fill: Option<Rgb>,
    stroke: Option<Rgb>,
) {
    ops.push(Operation::new("q", vec![]));
    if let Some(color) = fill {
        ops.push(Operation::new("rg", color_operands(color)));
    }
    if let Some(color) = stroke {
        ops.push(Operation::new("RG", color_operands(color)));
        ops.push(Operation::new("w", vec![GRID_LINE_WIDTH.into()]));
    }
    ops.push(Operation::new("re", rect_operands(x, y, width, height)));
    let paint = match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        _ => "S",
    };
    ops.push(Operation::new(paint, vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn show_text(
    ops: &mut Vec<Operation>,
    x: f32,
    y: f32,
    font: Font,
    size: f32,
    color: Rgb,
    text: &str,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("rg", color_operands(color)));
    ops.push(Operation::new("Tf", vec![font.resource().into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn footer(config: &RenderConfig, ops: &mut Vec<Operation>, page: usize, total: usize) {
    let text = format!("Page {page} of {total}");
    let (width, _) = config.page_dimensions();
    let x = (width - text_width(&text, Font::Regular, FOOTER_FONT_SIZE)) / 2.0;
    let y = (config.margin_bottom - FOOTER_FONT_SIZE) / 2.0 + 2.0;
    show_text(ops, x, y.max(2.0), Font::Regular, FOOTER_FONT_SIZE, GREY, &text);
}

fn write_document(
    config: &RenderConfig,
    title: &str,
    pages: Vec<Vec<Operation>>,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for font in [Font::Regular, Font::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let (width, height) = config.page_dimensions();
    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("sheetpress ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
