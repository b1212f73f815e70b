use std::fs;
use std::path::Path;

use card_catalog::{Catalog, MarkerId, SizePreset, Template};
use serde::Deserialize;

use crate::characters::{Character, SelectionRange, apply_marker, set_text};
use crate::error::{Error, Result};
use crate::render::compose::CompositionInput;
use crate::render::metrics::TextStyle;

/// Font sizes a job may request.
pub const FONT_SIZE_RANGE_PX: std::ops::RangeInclusive<f32> = 1.0..=512.0;

/// A highlighter stroke over `[start, end)` of the job text.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MarkerAssignment {
    pub start: usize,
    pub end: usize,
    pub marker: MarkerId,
}

impl MarkerAssignment {
    pub fn range(&self) -> SelectionRange {
        SelectionRange::new(self.start, self.end)
    }
}

/// One image to render, as written in a job file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RenderJob {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_font_size")]
    pub font_size_px: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub markers: Vec<MarkerAssignment>,
}

impl Default for RenderJob {
    fn default() -> Self {
        Self {
            template: default_template(),
            size: default_size(),
            font_size_px: default_font_size(),
            font_family: default_font_family(),
            text: String::new(),
            background_color: None,
            markers: Vec::new(),
        }
    }
}

impl RenderJob {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn validated(self) -> Result<Self> {
        if !FONT_SIZE_RANGE_PX.contains(&self.font_size_px) {
            return Err(Error::InvalidJob(format!(
                "font-size-px must be within {FONT_SIZE_RANGE_PX:?}, got {}",
                self.font_size_px
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(Error::InvalidJob(
                "font-family must not be blank".to_string(),
            ));
        }
        if let Some(color) = &self.background_color
            && color.trim().is_empty()
        {
            return Err(Error::InvalidJob(
                "background-color must not be blank when provided".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font_size_px, self.font_family.clone())
    }

    /// Text split into characters with every marker assignment applied in order.
    pub fn characters(&self) -> Vec<Character> {
        self.markers
            .iter()
            .fold(set_text(&self.text), |chars, assignment| {
                apply_marker(&chars, assignment.range(), assignment.marker)
            })
    }

    /// Looks up the template and size preset; unknown ids are errors.
    pub fn resolve<'c>(&self, catalog: &'c Catalog) -> Result<ResolvedJob<'c>> {
        let template = catalog
            .template(&self.template)
            .ok_or_else(|| Error::UnknownTemplate(self.template.clone()))?;
        let size = catalog
            .size(&self.size)
            .ok_or_else(|| Error::UnknownSize(self.size.clone()))?;
        Ok(ResolvedJob {
            template,
            size,
            markers: &catalog.markers,
            text_style: self.text_style(),
            characters: self.characters(),
            background_color: self.background_color.clone(),
        })
    }
}

/// A job bound to catalog entries, ready for composition.
#[derive(Debug, Clone)]
pub struct ResolvedJob<'c> {
    pub template: &'c Template,
    pub size: &'c SizePreset,
    pub markers: &'c [card_catalog::MarkerStyle],
    pub text_style: TextStyle,
    pub characters: Vec<Character>,
    pub background_color: Option<String>,
}

impl<'c> ResolvedJob<'c> {
    pub fn input(&self) -> CompositionInput<'_> {
        CompositionInput {
            template: self.template,
            size: self.size,
            text_style: &self.text_style,
            characters: &self.characters,
            background_color: self.background_color.as_deref(),
            markers: self.markers,
        }
    }
}

fn default_template() -> String {
    "solid".to_string()
}

fn default_size() -> String {
    "default".to_string()
}

fn default_font_size() -> f32 {
    TextStyle::DEFAULT_FONT_SIZE_PX
}

fn default_font_family() -> String {
    TextStyle::DEFAULT_FONT_FAMILY.to_string()
}
