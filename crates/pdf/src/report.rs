//! Assembles per-sheet sections into one report and writes it to disk.

use crate::config::{LayoutConfig, RenderConfig};
use crate::error::{PdfError, Result};
use crate::layout::{layout, DocumentSection, SectionBody, Truncation};
use crate::render::{Block, PdfRenderer, TextStyle};
use indexmap::IndexMap;
use sheetpress_sheet::NormalizedTable;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Loaded table or the reason the sheet could not be loaded
pub type SheetResult = std::result::Result<NormalizedTable, PdfError>;

/// What happened to one sheet during assembly
#[derive(Debug, Clone, PartialEq)]
pub enum SheetStatus {
    Rendered(Truncation),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetOutcome {
    pub name: String,
    pub status: SheetStatus,
}

impl SheetOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SheetStatus::Failed(_))
    }
}

/// A written report
#[derive(Debug, Clone)]
pub struct AssembledReport {
    pub path: PathBuf,
    /// Size of the written file in bytes
    pub size: u64,
    pub outcomes: Vec<SheetOutcome>,
}

impl AssembledReport {
    /// Sheets that rendered as tables
    #[must_use]
    pub fn rendered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).count()
    }
}

/// Combines layout and rendering for a whole workbook
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    layout: LayoutConfig,
    renderer: PdfRenderer,
}

impl ReportAssembler {
    #[must_use]
    pub fn new(layout: LayoutConfig, render: RenderConfig) -> Self {
        Self {
            layout,
            renderer: PdfRenderer::new(render),
        }
    }

    /// Turn sheets into report blocks, one section per sheet in order.
    ///
    /// Sheets that failed to load, or fail to lay out, become inline error
    /// notes; the remaining sheets are unaffected.
    #[must_use]
    pub fn build_blocks(
        &self,
        title: &str,
        sheets: &IndexMap<String, SheetResult>,
        notes: &[String],
    ) -> (Vec<Block>, Vec<SheetOutcome>) {
        let timestamp = chrono::Local::now().format("%B %d, %Y at %I:%M %p");
        let mut blocks = vec![
            Block::Title(title.to_string()),
            Block::Spacer(8.0),
            Block::Paragraph(format!("Generated on: {timestamp}"), TextStyle::Normal),
            Block::Spacer(18.0),
        ];
        let mut outcomes = Vec::with_capacity(sheets.len());

        for (index, (name, loaded)) in sheets.iter().enumerate() {
            let section = match loaded {
                Ok(table) => layout(name, table, &self.layout)
                    .unwrap_or_else(|e| DocumentSection::error(name, e.to_string())),
                Err(e) => DocumentSection::error(name, e.to_string()),
            };

            let status = match &section.body {
                SectionBody::Table(table) => SheetStatus::Rendered(table.truncation),
                SectionBody::Error(message) => {
                    tracing::error!(sheet = %name, error = %message, "sheet skipped");
                    SheetStatus::Failed(message.clone())
                }
            };
            outcomes.push(SheetOutcome {
                name: name.clone(),
                status,
            });

            push_section(&mut blocks, section);
            if index + 1 < sheets.len() {
                blocks.push(Block::PageBreak);
            }
        }

        if !notes.is_empty() {
            blocks.push(Block::Spacer(14.0));
            blocks.push(Block::Subheading("Notes:".to_string()));
            blocks.extend(notes.iter().map(|note| Block::Bullet(note.clone())));
        }

        (blocks, outcomes)
    }

    /// Render the report in memory.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::NoSheetsLoaded`] for an empty sheet map, or a
    /// render error from the PDF writer.
    pub fn render(
        &self,
        title: &str,
        sheets: &IndexMap<String, SheetResult>,
        notes: &[String],
    ) -> Result<(Vec<u8>, Vec<SheetOutcome>)> {
        if sheets.is_empty() {
            return Err(PdfError::NoSheetsLoaded);
        }
        let (blocks, outcomes) = self.build_blocks(title, sheets, notes);
        let bytes = self.renderer.render(title, &blocks)?;
        Ok((bytes, outcomes))
    }

    /// Render the report and write it to `output_path`.
    ///
    /// The file only appears once it is complete: bytes go to a temporary
    /// file next to the target which is then renamed into place.
    ///
    /// # Errors
    ///
    /// See [`ReportAssembler::render`]; also fails on IO errors.
    pub fn assemble(
        &self,
        title: &str,
        sheets: &IndexMap<String, SheetResult>,
        notes: &[String],
        output_path: &Path,
    ) -> Result<AssembledReport> {
        let (bytes, outcomes) = self.render(title, sheets, notes)?;
        write_atomic(output_path, &bytes)?;

        tracing::info!(
            path = %output_path.display(),
            bytes = bytes.len(),
            sheets = outcomes.len(),
            "report written"
        );
        Ok(AssembledReport {
            path: output_path.to_path_buf(),
            size: bytes.len() as u64,
            outcomes,
        })
    }
}

fn push_section(blocks: &mut Vec<Block>, section: DocumentSection) {
    blocks.push(Block::Heading(format!("Sheet: {}", section.title)));

    if let Some(summary) = &section.summary {
        blocks.push(Block::Subheading(format!("{} Summary:", section.title)));
        blocks.extend(summary.lines().into_iter().map(Block::Bullet));
        blocks.push(Block::Spacer(10.0));
    }

    match section.body {
        SectionBody::Table(table) => blocks.push(Block::Table(table)),
        SectionBody::Error(message) => blocks.push(Block::Paragraph(
            format!("Error processing sheet: {message}"),
            TextStyle::Error,
        )),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| PdfError::IoError(e.error))?;
    Ok(())
}
