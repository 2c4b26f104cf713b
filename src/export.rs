use tracing::{error, info};

use crate::config::Config;
use crate::document::{self, DocumentPacker, DocxPacker};
use crate::error::{ExportError, Result};
use crate::html;

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// Downloadable word-processor formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// HTML-flavoured legacy `.doc`
    Doc,
    /// Office Open XML `.docx`
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Doc => "doc",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Doc => "application/msword",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// A finished export, ready to hand to whatever saves or downloads it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export markdown in the given format, packing DOCX with [`DocxPacker`].
pub fn export(
    markdown: &str,
    format: ExportFormat,
    config: &Config,
) -> std::result::Result<ExportedFile, ExportError> {
    export_with(markdown, format, config, &DocxPacker)
}

/// Export markdown using a specific packer for the structured format.
///
/// Any failure is logged with its cause and reported as
/// [`ExportError::Failed`]; no partial output is returned.
pub fn export_with(
    markdown: &str,
    format: ExportFormat,
    config: &Config,
    packer: &dyn DocumentPacker,
) -> std::result::Result<ExportedFile, ExportError> {
    let bytes = match format {
        ExportFormat::Doc => Ok(legacy_bytes(markdown, config)),
        ExportFormat::Docx => docx_bytes(markdown, config, packer),
    };

    match bytes {
        Ok(bytes) => {
            let file_name = format!("{}.{}", config.export.file_name, format.extension());
            info!(file = %file_name, bytes = bytes.len(), "exported document");
            Ok(ExportedFile {
                file_name,
                mime_type: format.mime_type(),
                bytes,
            })
        }
        Err(e) => {
            error!(format = format.extension(), error = %e, "export failed");
            Err(ExportError::Failed)
        }
    }
}

fn legacy_bytes(markdown: &str, config: &Config) -> Vec<u8> {
    let document = html::render_document(markdown, &config.export.file_name, &config.render);
    let mut bytes = Vec::with_capacity(BYTE_ORDER_MARK.len() + document.len());
    bytes.extend_from_slice(BYTE_ORDER_MARK.as_bytes());
    bytes.extend_from_slice(document.as_bytes());
    bytes
}

fn docx_bytes(markdown: &str, config: &Config, packer: &dyn DocumentPacker) -> Result<Vec<u8>> {
    let document = document::assemble(markdown, &config.render);
    packer.pack(&document)
}
