//! Font sources and face resolution.
//!
//! Faces are resolved from a prioritized list of sources; the first source
//! that loads wins. When none does, the built-in bitmap face is used. It
//! only exists at one native size, so larger requests are rendered at that
//! size and scaled up (see `text_renderer`).
//!
//! # Example
//!
//! ```ignore
//! use webmark::watermark::font::{FontChain, FontConfig};
//!
//! let chain = FontChain::from_config(&FontConfig::default());
//! let face = chain.resolve();
//! println!("rendering with {}", face.name());
//! ```

use ab_glyph::FontVec;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoFont;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The built-in fixed-size face.
pub fn builtin_font() -> &'static MonoFont<'static> {
    &FONT_10X20
}

/// Native pixel height of the built-in face.
pub fn builtin_native_size() -> u32 {
    builtin_font().character_size.height
}

fn default_font_names() -> Vec<String> {
    [
        "arial.ttf",
        "Arial.ttf",
        "DejaVuSans.ttf",
        "Verdana.ttf",
        "times.ttf",
        "Times New Roman.ttf",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Platform font directories searched for each font name.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts"]
    } else if cfg!(target_os = "macos") {
        &[
            "/Library/Fonts",
            "/System/Library/Fonts",
            "/System/Library/Fonts/Supplemental",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/truetype/msttcorefonts",
            "/usr/share/fonts/TTF",
            "/usr/share/fonts/dejavu",
            "/usr/local/share/fonts",
        ]
    };
    dirs.iter().map(PathBuf::from).collect()
}

/// Font lookup configuration (the `fonts` section of a job profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font file names, tried in order
    #[serde(default = "default_font_names")]
    pub names: Vec<String>,

    /// Directories searched for each name (the name itself is tried first)
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            names: default_font_names(),
            search_dirs: default_search_dirs(),
        }
    }
}

/// Why a font source could not provide a face.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("font '{0}' not found")]
    NotFound(String),

    #[error("failed to read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font data in {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Something that can provide a scalable font face.
pub trait FontSource: Send + Sync {
    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// Load the face.
    fn load(&self) -> Result<FontVec, FontLoadError>;
}

/// A font file looked up by name, first as given, then in each search dir.
#[derive(Debug, Clone)]
pub struct FileFontSource {
    name: String,
    search_dirs: Vec<PathBuf>,
}

impl FileFontSource {
    pub fn new(name: impl Into<String>, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            search_dirs,
        }
    }

    /// Candidate paths in lookup order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let direct = PathBuf::from(&self.name);
        let mut candidates = vec![direct.clone()];
        if direct.is_relative() {
            candidates.extend(self.search_dirs.iter().map(|dir| dir.join(&self.name)));
        }
        candidates
    }

    fn load_path(path: &Path) -> Result<FontVec, FontLoadError> {
        let data = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        FontVec::try_from_vec(data).map_err(|e| FontLoadError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl FontSource for FileFontSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<FontVec, FontLoadError> {
        let path = self
            .candidates()
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| FontLoadError::NotFound(self.name.clone()))?;
        Self::load_path(&path)
    }
}

/// The face selected for rendering.
pub enum Face {
    /// A scalable outline font.
    Outline { name: String, font: FontVec },
    /// The built-in bitmap face.
    Builtin,
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Outline { name, .. } => f.debug_tuple("Outline").field(name).finish(),
            Face::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Face {
    pub fn name(&self) -> &str {
        match self {
            Face::Outline { name, .. } => name,
            Face::Builtin => "builtin",
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Face::Builtin)
    }
}

/// Prioritized list of font sources.
#[derive(Default)]
pub struct FontChain {
    sources: Vec<Box<dyn FontSource>>,
}

impl FontChain {
    /// An empty chain, which always resolves to the built-in face.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Build a chain of file sources from configuration.
    pub fn from_config(config: &FontConfig) -> Self {
        let mut chain = Self::default();
        for name in &config.names {
            chain.push(FileFontSource::new(name.clone(), config.search_dirs.clone()));
        }
        chain
    }

    /// Append a source with the lowest priority so far.
    pub fn push(&mut self, source: impl FontSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load the first available face, falling back to the built-in face.
    pub fn resolve(&self) -> Face {
        for source in &self.sources {
            match source.load() {
                Ok(font) => {
                    tracing::debug!(font = source.name(), "Loaded watermark font");
                    return Face::Outline {
                        name: source.name().to_string(),
                        font,
                    };
                }
                Err(e) => {
                    tracing::debug!(font = source.name(), error = %e, "Font source unavailable");
                }
            }
        }

        if !self.sources.is_empty() {
            tracing::warn!(
                tried = self.sources.len(),
                native_size = builtin_native_size(),
                "No font could be loaded, using built-in face"
            );
        }
        Face::Builtin
    }
}
