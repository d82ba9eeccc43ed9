use crate::error::{PdfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Limits and options for turning one table into a document section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub max_rows_per_sheet: usize,
    pub max_cols_per_sheet: usize,
    pub include_summaries: bool,
    /// Narrowest column, in points
    pub min_col_width: f32,
    /// Widest column, in points
    pub max_col_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_rows_per_sheet: 30,
            max_cols_per_sheet: 10,
            include_summaries: true,
            min_col_width: 80.0,
            max_col_width: 200.0,
        }
    }
}

impl LayoutConfig {
    /// Limits used when converting the proforma bundle (effectively unrestricted)
    #[must_use]
    pub fn proforma() -> Self {
        Self {
            max_rows_per_sheet: 1000,
            max_cols_per_sheet: 50,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows_per_sheet = max_rows;
        self
    }

    #[must_use]
    pub fn with_max_cols(mut self, max_cols: usize) -> Self {
        self.max_cols_per_sheet = max_cols;
        self
    }

    #[must_use]
    pub fn with_summaries(mut self, include: bool) -> Self {
        self.include_summaries = include;
        self
    }

    #[must_use]
    pub fn with_col_width_range(mut self, min: f32, max: f32) -> Self {
        self.min_col_width = min;
        self.max_col_width = max;
        self
    }

    /// Check that the column width range is usable
    pub fn validate(&self) -> std::result::Result<(), String> {
        let (min, max) = (self.min_col_width, self.max_col_width);
        if !min.is_finite() || !max.is_finite() || min < 0.0 {
            return Err(format!("column widths must be finite and non-negative ({min}..{max})"));
        }
        if min > max {
            return Err(format!("min_col_width {min} exceeds max_col_width {max}"));
        }
        Ok(())
    }
}

/// Paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// Portrait width and height in points
    #[must_use]
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Page geometry and typography for the PDF renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
    pub table_header_font_size: f32,
    pub table_font_size: f32,
    /// Space between cell border and text
    pub cell_padding: f32,
}

const INCH: f32 = 72.0;

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            orientation: Orientation::Landscape,
            margin_left: 0.3 * INCH,
            margin_right: 0.3 * INCH,
            margin_top: 0.5 * INCH,
            margin_bottom: 0.3 * INCH,
            title_font_size: 16.0,
            heading_font_size: 14.0,
            body_font_size: 10.0,
            table_header_font_size: 8.0,
            table_font_size: 7.0,
            cell_padding: 3.0,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Width and height in points after applying the orientation
    #[must_use]
    pub fn page_dimensions(&self) -> (f32, f32) {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Width available between the left and right margins
    #[must_use]
    pub fn content_width(&self) -> f32 {
        self.page_dimensions().0 - self.margin_left - self.margin_right
    }

    /// Check that the margins leave room for content
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.page_dimensions();
        let usable_height = height - self.margin_top - self.margin_bottom;
        if self.content_width() <= 0.0 || usable_height <= 0.0 {
            return Err(PdfError::Config(format!(
                "margins leave no room on a {width}x{height} page"
            )));
        }
        let sizes = [
            self.title_font_size,
            self.heading_font_size,
            self.body_font_size,
            self.table_header_font_size,
            self.table_font_size,
        ];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PdfError::Config("font sizes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Layout and rendering settings together, as read from a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl ReportConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Config`] on malformed JSON or unusable values.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::default().merge_json(json)
    }

    /// Overlay the fields set in a JSON config onto `self`. Fields the JSON
    /// leaves out keep their current values.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Config`] on malformed JSON or unusable values.
    pub fn merge_json(self, json: &str) -> Result<Self> {
        let overlay: Value =
            serde_json::from_str(json).map_err(|e| PdfError::Config(e.to_string()))?;
        let mut merged = serde_json::to_value(&self).map_err(|e| PdfError::Config(e.to_string()))?;
        merge_values(&mut merged, overlay);

        let config: ReportConfig =
            serde_json::from_value(merged).map_err(|e| PdfError::Config(e.to_string()))?;
        config.layout.validate().map_err(PdfError::Config)?;
        config.render.validate()?;
        Ok(config)
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
