use thiserror::Error;

/// Internal failures of the conversion pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to pack document: {0}")]
    Pack(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("preview container class {0:?} is not a CSS identifier")]
    ContainerClass(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The single failure an export reports to the user. The internal cause is
/// logged, never shown.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExportError {
    #[error("failed to export, please try again")]
    Failed,
}
