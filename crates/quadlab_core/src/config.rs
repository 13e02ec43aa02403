//! Line-oriented render configuration.
//!
//! ```text
//! # comment
//! vert = shaders/quad.vert.wgsl
//! frag = shaders/plasma.frag.wgsl
//! texture = textures/tile.png
//! ```
//!
//! The loaded text is kept as one owned buffer; resolved paths are byte ranges
//! into it, so nothing is copied or rewritten while parsing. Reloading builds a
//! brand-new `ResourceConfig`; there is no merging with the previous one.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "render.conf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three resources a config can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Vert,
    Frag,
    Texture,
}

impl ResourceKey {
    pub const ALL: &'static [ResourceKey] =
        &[ResourceKey::Vert, ResourceKey::Frag, ResourceKey::Texture];

    pub fn name(self) -> &'static str {
        match self {
            Self::Vert => "vert",
            Self::Frag => "frag",
            Self::Texture => "texture",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }

    fn index(self) -> usize {
        match self {
            Self::Vert => 0,
            Self::Frag => 1,
            Self::Texture => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnsupportedKey(String),
    MissingSeparator(String),
}

/// A non-fatal problem on one config line. `line` and `column` are 1-based;
/// `column` points at the first character of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn key(&self) -> &str {
        match &self.kind {
            DiagnosticKind::UnsupportedKey(key) | DiagnosticKind::MissingSeparator(key) => key,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnsupportedKey(key) => write!(
                f,
                "{}:{}: ERROR: unsupported key `{}`",
                self.line, self.column, key
            ),
            DiagnosticKind::MissingSeparator(key) => write!(
                f,
                "{}:{}: ERROR: expected `=` after `{}`",
                self.line, self.column, key
            ),
        }
    }
}

/// Borrowed result of parsing config text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedConfig<'a> {
    pub vert: Option<&'a str>,
    pub frag: Option<&'a str>,
    pub texture: Option<&'a str>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ParsedConfig<'a> {
    pub fn get(&self, key: ResourceKey) -> Option<&'a str> {
        match key {
            ResourceKey::Vert => self.vert,
            ResourceKey::Frag => self.frag,
            ResourceKey::Texture => self.texture,
        }
    }

    fn set(&mut self, key: ResourceKey, value: &'a str) {
        match key {
            ResourceKey::Vert => self.vert = Some(value),
            ResourceKey::Frag => self.frag = Some(value),
            ResourceKey::Texture => self.texture = Some(value),
        }
    }
}

/// Parse config text. Never fails: malformed lines only produce diagnostics,
/// and a later assignment to the same key wins.
pub fn parse(source: &str) -> ParsedConfig<'_> {
    let mut parsed = ParsedConfig::default();

    for (row, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let column = raw_line.len() - line.len() + 1;

        let Some((key, value)) = line.split_once('=') else {
            parsed.diagnostics.push(Diagnostic {
                line: row + 1,
                column,
                kind: DiagnosticKind::MissingSeparator(line.trim_end().to_string()),
            });
            continue;
        };
        let key = key.trim();
        let value = value.trim_start();

        match ResourceKey::from_name(key) {
            Some(resource) => parsed.set(resource, value),
            None => parsed.diagnostics.push(Diagnostic {
                line: row + 1,
                column,
                kind: DiagnosticKind::UnsupportedKey(key.to_string()),
            }),
        }
    }

    parsed
}

/// Resolved resource paths backed by the config text they were parsed from.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    path: PathBuf,
    source: String,
    spans: [Option<Range<usize>>; 3],
    diagnostics: Vec<Diagnostic>,
}

impl ResourceConfig {
    /// Read and parse the config at `path`. An unreadable file is the only error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, source))
    }

    pub fn from_source(path: &Path, source: String) -> Self {
        let parsed = parse(&source);
        let mut spans: [Option<Range<usize>>; 3] = Default::default();
        for &key in ResourceKey::ALL {
            spans[key.index()] = parsed.get(key).map(|value| span_within(&source, value));
        }
        let diagnostics = parsed.diagnostics;
        Self {
            path: path.to_path_buf(),
            source,
            spans,
            diagnostics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: ResourceKey) -> Option<&str> {
        self.spans[key.index()]
            .clone()
            .map(|range| &self.source[range])
    }

    pub fn vert_path(&self) -> Option<&Path> {
        self.get(ResourceKey::Vert).map(Path::new)
    }

    pub fn frag_path(&self) -> Option<&Path> {
        self.get(ResourceKey::Frag).map(Path::new)
    }

    pub fn texture_path(&self) -> Option<&Path> {
        self.get(ResourceKey::Texture).map(Path::new)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Log resolved paths and every diagnostic, prefixed with the config path.
    pub fn report(&self) {
        for &key in ResourceKey::ALL {
            match self.get(key) {
                Some(value) => log::info!("{} path: {}", key.name(), value),
                None => log::warn!("{}: no `{}` key", self.path.display(), key.name()),
            }
        }
        for diagnostic in &self.diagnostics {
            log::warn!("{}:{}", self.path.display(), diagnostic);
        }
    }
}

/// Byte range of `inner` inside `outer`. `inner` must be a subslice of `outer`.
fn span_within(outer: &str, inner: &str) -> Range<usize> {
    let start = inner.as_ptr() as usize - outer.as_ptr() as usize;
    debug_assert!(start + inner.len() <= outer.len());
    start..start + inner.len()
}
