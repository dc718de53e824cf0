//! Copyright metadata for output files.
//!
//! The copyright notice is written to the EXIF, IPTC and XMP fields that
//! common viewers read; the holder's name goes to the credit fields. Writing
//! is delegated to a `MetadataWriter`, by default the `exiftool` binary.
//!
//! # Example
//!
//! ```ignore
//! use webmark::metadata::{copyright_fields, ExifToolWriter, MetadataWriter};
//!
//! let fields = copyright_fields("Example Studio", None);
//! ExifToolWriter::new().write(Path::new("out.jpg"), &fields)?;
//! ```

use chrono::Datelike;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Fields that receive the full copyright notice.
const NOTICE_FIELDS: &[&str] = &[
    "Copyright",
    "CopyrightNotice",
    "XMP:Rights",
    "IPTC:CopyrightNotice",
    "EXIF:Copyright",
];

/// Fields that receive the holder's name.
const HOLDER_FIELDS: &[&str] = &["IPTC:Credit", "IPTC:By-line", "XMP:Creator"];

/// Errors raised while writing metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The tool ran and exited unsuccessfully.
    #[error("{program} failed with status {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The tool could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// One metadata tag and the value to store in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataField {
    pub tag: String,
    pub value: String,
}

impl MetadataField {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Year used when none is configured.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// The notice stored in the copyright fields.
pub fn copyright_notice(holder: &str, year: Option<i32>) -> String {
    let year = year.unwrap_or_else(current_year);
    format!("Copyright © {} {}. All rights reserved.", year, holder)
}

/// Tags to write, in order: notice fields first, then holder fields.
pub fn copyright_fields(holder: &str, year: Option<i32>) -> Vec<MetadataField> {
    let notice = copyright_notice(holder, year);
    NOTICE_FIELDS
        .iter()
        .map(|tag| MetadataField::new(*tag, notice.clone()))
        .chain(
            HOLDER_FIELDS
                .iter()
                .map(|tag| MetadataField::new(*tag, holder)),
        )
        .collect()
}

/// Writes metadata fields into an image file in place.
pub trait MetadataWriter: Send + Sync {
    fn write(&self, path: &Path, fields: &[MetadataField]) -> Result<(), MetadataError>;
}

/// `MetadataWriter` backed by the `exiftool` command line tool.
#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    program: PathBuf,
}

impl Default for ExifToolWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExifToolWriter {
    pub fn new() -> Self {
        Self::with_program("exiftool")
    }

    /// Use a specific executable instead of `exiftool` from `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Command line arguments for writing `fields` into `path`.
pub fn exiftool_args(path: &Path, fields: &[MetadataField]) -> Vec<OsString> {
    let mut args = Vec::with_capacity(fields.len() + 2);
    args.push(OsString::from("-overwrite_original"));
    for field in fields {
        args.push(OsString::from(format!("-{}={}", field.tag, field.value)));
    }
    args.push(path.as_os_str().to_os_string());
    args
}

impl MetadataWriter for ExifToolWriter {
    fn write(&self, path: &Path, fields: &[MetadataField]) -> Result<(), MetadataError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(exiftool_args(path, fields))
            .output()
            .map_err(|source| MetadataError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MetadataError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(path = %path.display(), fields = fields.len(), "Wrote metadata");
        Ok(())
    }
}
