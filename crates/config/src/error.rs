//! Error types for configuration loading and validation.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors reading, parsing, or validating a configuration file.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// The file could not be read.
    #[error("{message}")]
    Read {
        /// Path that was read, when known.
        path: Option<PathBuf>,
        /// Underlying IO error message.
        message: String,
    },
    /// The file's TOML could not be parsed.
    #[error("{message}")]
    Parse {
        /// Path that was parsed, when known.
        path: Option<PathBuf>,
        /// 1-based line of the parse failure.
        line: usize,
        /// 1-based column of the parse failure.
        col: usize,
        /// Human-readable parse failure description.
        message: String,
        /// Source excerpt around the failure, with a caret pointer.
        excerpt: String,
    },
    /// The file parsed but failed validation (out-of-range value, unknown
    /// key, or a grammar a field's string value doesn't satisfy).
    #[error("{message}")]
    Validation {
        /// Path that was validated, when known.
        path: Option<PathBuf>,
        /// Dotted key path of the offending field, e.g. `"hints.hint_characters"`.
        field: String,
        /// Human-readable validation failure description.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location and an
    /// excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Config parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Config parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Validation {
                path,
                field,
                message,
            } => match path {
                Some(p) => format!(
                    "Config validation error at {} ({}): {}",
                    p.display(),
                    field,
                    message
                ),
                None => format!("Config validation error ({}): {}", field, message),
            },
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }

    /// Build a `Parse` error from a `toml` deserialize error and the
    /// original source text.
    pub fn from_toml(source: &str, err: &toml::de::Error, path: Option<&Path>) -> Self {
        let byte_start = err.span().map(|s| s.start).unwrap_or(0);

        let mut line_no = 1usize;
        let mut col_no = 1usize;
        for (idx, ch) in source.char_indices() {
            if idx >= byte_start {
                break;
            }
            if ch == '\n' {
                line_no += 1;
                col_no = 1;
            } else {
                col_no += 1;
            }
        }

        let lines: Vec<&str> = source.lines().collect();
        let total = lines.len();
        let start = max(1usize, line_no.saturating_sub(2));
        let end = min(total, line_no + 1);

        let mut out = String::new();
        for n in start..=end.max(start) {
            let text = lines.get(n - 1).copied().unwrap_or("");
            let _ignored = writeln!(out, " {:>4} | {}", n, text);
            if n == line_no {
                let prefix = format!(" {:>4} | ", n);
                let _ignored = writeln!(
                    out,
                    "{}{}^",
                    " ".repeat(prefix.len()),
                    " ".repeat(col_no.saturating_sub(1))
                );
            }
        }

        Self::Parse {
            path: path.map(|p| p.to_path_buf()),
            line: line_no,
            col: col_no,
            message: err.message().to_string(),
            excerpt: out,
        }
    }

    /// Build a `Validation` error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: None,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Attach `path` to this error, if it doesn't already carry one.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Read { message, .. } => Self::Read {
                path: Some(path.to_path_buf()),
                message,
            },
            Self::Parse {
                line,
                col,
                message,
                excerpt,
                ..
            } => Self::Parse {
                path: Some(path.to_path_buf()),
                line,
                col,
                message,
                excerpt,
            },
            Self::Validation { field, message, .. } => Self::Validation {
                path: Some(path.to_path_buf()),
                field,
                message,
            },
        }
    }
}
