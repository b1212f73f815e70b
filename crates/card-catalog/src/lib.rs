use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Largest width or height a size preset may declare.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

pub use markers::{MarkerId, MarkerStyle, marker_color};
pub use templates::{Background, PatternKind, RenderProfile, Template, TemplateFamily, TextPosition};

mod markers {
    use super::*;

    /// Highlighter pen applied to a single character.
    #[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash, Default)]
    #[serde(rename_all = "kebab-case")]
    pub enum MarkerId {
        #[default]
        None,
        Yellow,
        Green,
        Pink,
        Blue,
    }

    impl MarkerId {
        pub fn as_str(self) -> &'static str {
            match self {
                MarkerId::None => "none",
                MarkerId::Yellow => "yellow",
                MarkerId::Green => "green",
                MarkerId::Pink => "pink",
                MarkerId::Blue => "blue",
            }
        }

        pub fn is_none(self) -> bool {
            self == MarkerId::None
        }
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    pub struct MarkerStyle {
        pub id: MarkerId,
        /// `None` only for the `none` marker, which paints nothing.
        #[serde(default)]
        pub color: Option<String>,
        pub label: String,
    }

    impl MarkerStyle {
        pub(crate) fn new(id: MarkerId, color: Option<&str>, label: &str) -> Self {
            Self {
                id,
                color: color.map(str::to_string),
                label: label.to_string(),
            }
        }

        pub fn validate(&self) -> Result<()> {
            let prefix = format!("markers.{}", self.id.as_str());
            match (&self.id, &self.color) {
                (MarkerId::None, Some(_)) => {
                    anyhow::bail!("{prefix}.color must be omitted for the none marker")
                }
                (MarkerId::None, None) => {}
                (_, None) => anyhow::bail!("{prefix}.color is required"),
                (_, Some(color)) => ensure!(
                    is_hex_color(color),
                    "{prefix}.color must be a #rrggbb hex color, got {color:?}"
                ),
            }
            ensure!(
                !self.label.trim().is_empty(),
                "{prefix}.label must not be blank"
            );
            Ok(())
        }
    }

    /// Hex color of a marker pen. `None` for the `none` marker or a pen the
    /// table does not list.
    pub fn marker_color(markers: &[MarkerStyle], id: MarkerId) -> Option<&str> {
        markers
            .iter()
            .find(|marker| marker.id == id)
            .and_then(|marker| marker.color.as_deref())
    }
}

mod templates {
    use super::*;

    #[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "kebab-case")]
    pub enum PatternKind {
        Wave,
        Dots,
        Hexagon,
        Grid,
        Stripes,
        Circles,
        Triangles,
    }

    impl PatternKind {
        pub const ALL: [PatternKind; 7] = [
            PatternKind::Wave,
            PatternKind::Dots,
            PatternKind::Hexagon,
            PatternKind::Grid,
            PatternKind::Stripes,
            PatternKind::Circles,
            PatternKind::Triangles,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                PatternKind::Wave => "wave",
                PatternKind::Dots => "dots",
                PatternKind::Hexagon => "hexagon",
                PatternKind::Grid => "grid",
                PatternKind::Stripes => "stripes",
                PatternKind::Circles => "circles",
                PatternKind::Triangles => "triangles",
            }
        }
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    #[serde(tag = "kind", rename_all = "kebab-case")]
    pub enum Background {
        /// Flat fill. The color is the default; a render request may override it.
        Solid { color: String },
        /// CSS-like gradient string; the first two `#rrggbb` values are the stops.
        Gradient { spec: String },
        /// Flat base fill with a translucent procedural overlay.
        Pattern { color: String, pattern: PatternKind },
    }

    impl Background {
        pub fn kind_name(&self) -> &'static str {
            match self {
                Background::Solid { .. } => "solid",
                Background::Gradient { .. } => "gradient",
                Background::Pattern { .. } => "pattern",
            }
        }
    }

    /// Relative anchor of the text block, as fractions of the canvas size.
    #[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    pub struct TextPosition {
        pub x: f32,
        pub y: f32,
    }

    impl Default for TextPosition {
        fn default() -> Self {
            Self { x: 0.5, y: 0.5 }
        }
    }

    /// Layout constants shared by a group of templates.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct RenderProfile {
        pub line_height_multiplier: f32,
        pub marker_alpha: f32,
        pub marker_height_ratio: f32,
    }

    impl RenderProfile {
        pub const STANDARD: RenderProfile = RenderProfile {
            line_height_multiplier: 1.5,
            marker_alpha: 0.3,
            marker_height_ratio: 1.0,
        };

        pub const CLASSIC: RenderProfile = RenderProfile {
            line_height_multiplier: 1.2,
            marker_alpha: 0.5,
            marker_height_ratio: 0.8,
        };
    }

    #[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "kebab-case")]
    pub enum TemplateFamily {
        #[default]
        Standard,
        Classic,
    }

    impl TemplateFamily {
        pub fn profile(self) -> RenderProfile {
            match self {
                TemplateFamily::Standard => RenderProfile::STANDARD,
                TemplateFamily::Classic => RenderProfile::CLASSIC,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    pub struct Template {
        pub id: String,
        pub name: String,
        pub background: Background,
        #[serde(default)]
        pub text_position: TextPosition,
        #[serde(default)]
        pub family: TemplateFamily,
    }

    impl Template {
        pub(crate) fn solid(id: &str, name: &str, color: &str) -> Self {
            Self::new(
                id,
                name,
                Background::Solid {
                    color: color.to_string(),
                },
            )
        }

        pub(crate) fn gradient(id: &str, name: &str, spec: &str) -> Self {
            Self::new(
                id,
                name,
                Background::Gradient {
                    spec: spec.to_string(),
                },
            )
        }

        pub(crate) fn pattern(id: &str, name: &str, color: &str, pattern: PatternKind) -> Self {
            Self::new(
                id,
                name,
                Background::Pattern {
                    color: color.to_string(),
                    pattern,
                },
            )
        }

        fn new(id: &str, name: &str, background: Background) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                background,
                text_position: TextPosition::default(),
                family: TemplateFamily::default(),
            }
        }

        pub fn profile(&self) -> RenderProfile {
            self.family.profile()
        }

        pub fn validate(&self) -> Result<()> {
            let prefix = format!("templates.{}", self.id);
            ensure!(!self.id.trim().is_empty(), "template id must not be blank");
            ensure!(
                !self.name.trim().is_empty(),
                "{prefix}.name must not be blank"
            );
            for (axis, value) in [("x", self.text_position.x), ("y", self.text_position.y)] {
                ensure!(
                    value.is_finite() && (0.0..=1.0).contains(&value),
                    "{prefix}.text-position.{axis} must be within [0, 1]"
                );
            }
            match &self.background {
                Background::Solid { color } | Background::Pattern { color, .. } => ensure!(
                    is_hex_color(color),
                    "{prefix}.background.color must be a #rrggbb hex color, got {color:?}"
                ),
                Background::Gradient { spec } => ensure!(
                    !spec.trim().is_empty(),
                    "{prefix}.background.spec must not be blank"
                ),
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SizePreset {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub label: String,
}

impl SizePreset {
    fn new(id: &str, width: u32, height: u32, label: &str) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FontOption {
    pub family: String,
    #[serde(default)]
    pub label: String,
}

/// Static choices offered to the user. Passed into the renderer, never global.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    pub templates: Vec<Template>,
    pub sizes: Vec<SizePreset>,
    #[serde(default = "default_markers")]
    pub markers: Vec<MarkerStyle>,
    #[serde(default = "default_fonts")]
    pub fonts: Vec<FontOption>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            templates: default_templates(),
            sizes: default_sizes(),
            markers: default_markers(),
            fonts: default_fonts(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml).context("failed to parse catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog at {}", path.display()))?;
        Self::from_yaml_str(&data)
            .with_context(|| format!("invalid catalog at {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.templates.is_empty(), "catalog must define templates");
        ensure!(!self.sizes.is_empty(), "catalog must define sizes");

        let mut seen = HashSet::new();
        for template in &self.templates {
            template.validate()?;
            ensure!(
                seen.insert(template.id.as_str()),
                "duplicate template id {:?}",
                template.id
            );
        }

        let mut seen = HashSet::new();
        for size in &self.sizes {
            ensure!(
                size.width > 0 && size.height > 0,
                "sizes.{} must have positive dimensions",
                size.id
            );
            ensure!(
                size.width <= MAX_CANVAS_SIDE && size.height <= MAX_CANVAS_SIDE,
                "sizes.{} must be at most {MAX_CANVAS_SIDE} pixels per side, got {}x{}",
                size.id,
                size.width,
                size.height
            );
            ensure!(
                seen.insert(size.id.as_str()),
                "duplicate size id {:?}",
                size.id
            );
        }

        let mut seen = HashSet::new();
        for marker in &self.markers {
            marker.validate()?;
            ensure!(
                seen.insert(marker.id),
                "duplicate marker id {:?}",
                marker.id.as_str()
            );
        }

        for font in &self.fonts {
            ensure!(
                !font.family.trim().is_empty(),
                "fonts.family must not be blank"
            );
        }
        Ok(())
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn size(&self, id: &str) -> Option<&SizePreset> {
        self.sizes.iter().find(|size| size.id == id)
    }

}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_hex_color(value: &str) -> bool {
    let hex = value.strip_prefix('#').unwrap_or(value);
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn default_sizes() -> Vec<SizePreset> {
    vec![
        SizePreset::new("default", 1080, 1350, "1080×1350 (default)"),
        SizePreset::new("square", 1080, 1080, "1080×1080 (square)"),
        SizePreset::new("landscape", 1920, 1080, "1920×1080 (landscape)"),
        SizePreset::new("medium", 800, 600, "800×600"),
        SizePreset::new("small", 500, 500, "500×500 (small)"),
    ]
}

fn default_templates() -> Vec<Template> {
    use PatternKind::*;
    vec![
        Template::solid("solid", "Custom solid", "#2c3e50"),
        Template::gradient("gradient1", "Gradient 1", "linear-gradient(45deg, #ff6b6b, #4ecdc4)"),
        Template::gradient("gradient2", "Gradient 2", "linear-gradient(120deg, #f6d365, #fda085)"),
        Template::gradient("gradient3", "Gradient 3", "linear-gradient(to right, #8e2de2, #4a00e0)"),
        Template::gradient("gradient4", "Gradient 4", "linear-gradient(135deg, #00dbde, #fc00ff)"),
        Template::gradient("gradient5", "Gradient 5", "linear-gradient(to right, #2c3e50, #3498db)"),
        Template::gradient("gradient6", "Gradient 6", "linear-gradient(60deg, #abecd6, #fbed96)"),
        Template::pattern("wave", "Waves", "#3498db", Wave),
        Template::pattern("dots", "Dots", "#2ecc71", Dots),
        Template::pattern("hexagon", "Hexagons", "#9b59b6", Hexagon),
        Template::pattern("grid", "Grid", "#ffffff", Grid),
        Template::gradient("gradient7", "Gradient 7", "linear-gradient(to right, #4facfe, #00f2fe)"),
        Template::gradient("gradient8", "Gradient 8", "linear-gradient(135deg, #667eea, #764ba2)"),
        Template::gradient("gradient9", "Gradient 9", "linear-gradient(to right, #ff758c, #ff7eb3)"),
        Template::gradient("gradient10", "Gradient 10", "linear-gradient(45deg, #08AEEA, #2AF598)"),
        Template::gradient("gradient11", "Gradient 11", "linear-gradient(to right, #434343, #000000)"),
        Template::gradient("gradient12", "Gradient 12", "linear-gradient(to right, #93a5cf, #e4efe9)"),
        Template::pattern("stripes", "Stripes", "#f39c12", Stripes),
        Template::pattern("circles", "Circles", "#e74c3c", Circles),
        Template::pattern("triangles", "Triangles", "#27ae60", Triangles),
    ]
}

fn default_markers() -> Vec<MarkerStyle> {
    vec![
        MarkerStyle::new(MarkerId::None, None, "No marker"),
        MarkerStyle::new(MarkerId::Yellow, Some("#ffd700"), "Yellow marker"),
        MarkerStyle::new(MarkerId::Green, Some("#98fb98"), "Green marker"),
        MarkerStyle::new(MarkerId::Pink, Some("#ffb6c1"), "Pink marker"),
        MarkerStyle::new(MarkerId::Blue, Some("#87cefa"), "Blue marker"),
    ]
}

fn default_fonts() -> Vec<FontOption> {
    [
        ("Arial", "Arial"),
        ("Microsoft YaHei", "Microsoft YaHei"),
        ("SimSun", "SimSun"),
        ("KaiTi", "KaiTi"),
        ("SimHei", "SimHei"),
        ("STXihei", "STXihei"),
    ]
    .into_iter()
    .map(|(family, label)| FontOption {
        family: family.to_string(),
        label: label.to_string(),
    })
    .collect()
}
