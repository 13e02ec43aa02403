use std::path::PathBuf;

use quadlab_core::{VertexBatch, DEFAULT_CONFIG_PATH, VERTEX_CAPACITY};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("`--grid` needs a cell count")]
    MissingGridValue,
    #[error("`--grid {0}` is not a positive integer")]
    InvalidGrid(String),
    #[error("`--grid {n}` needs {needed} vertices; the batch holds {}", VERTEX_CAPACITY)]
    GridTooLarge { n: u32, needed: usize },
    #[error("unexpected argument `{0}`")]
    Unexpected(String),
}

/// Command line: `quadlab [CONFIG] [--grid N]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: PathBuf,
    /// Draw an N×N checkerboard instead of the full-screen quad.
    pub grid: Option<u32>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            grid: None,
        }
    }
}

impl Args {
    pub fn parse<I, S>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut config_seen = false;
        let mut iter = args.into_iter().map(Into::into);

        while let Some(arg) = iter.next() {
            if arg == "--grid" {
                let value = iter.next().ok_or(ArgsError::MissingGridValue)?;
                parsed.grid = Some(parse_grid(&value)?);
            } else if let Some(value) = arg.strip_prefix("--grid=") {
                parsed.grid = Some(parse_grid(value)?);
            } else if !config_seen && !arg.starts_with("--") {
                parsed.config = PathBuf::from(arg);
                config_seen = true;
            } else {
                return Err(ArgsError::Unexpected(arg));
            }
        }
        Ok(parsed)
    }
}

fn parse_grid(value: &str) -> Result<u32, ArgsError> {
    let n = match value.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err(ArgsError::InvalidGrid(value.to_string())),
    };
    let needed = VertexBatch::checkerboard_len(n);
    if needed > VERTEX_CAPACITY {
        return Err(ArgsError::GridTooLarge { n, needed });
    }
    Ok(n)
}
