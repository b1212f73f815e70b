use thiserror::Error;

/// Library error type for textcard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A color string is not a `#rrggbb` hex value.
    #[error("invalid color spec: {0:?}")]
    InvalidColorSpec(String),

    /// No usable font face, or the font produced unusable measurements.
    #[error("glyph metrics unavailable: {0}")]
    MetricsUnavailable(String),

    /// The requested template id is not in the catalog.
    #[error("unknown template: {0:?}")]
    UnknownTemplate(String),

    /// The requested size preset id is not in the catalog.
    #[error("unknown size preset: {0:?}")]
    UnknownSize(String),

    /// The surface cannot be allocated at the requested dimensions.
    #[error("invalid surface size: {0}")]
    InvalidSize(String),

    /// Font size or family cannot be laid out.
    #[error("invalid text style: {0}")]
    InvalidTextStyle(String),

    /// The render job failed validation.
    #[error("invalid render job: {0}")]
    InvalidJob(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// PNG encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
