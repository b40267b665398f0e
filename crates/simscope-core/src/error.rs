//! Error types for simscope-core

use std::fmt::Write;
use thiserror::Error;

/// Remediation command for resolving an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemediationCommand {
    /// Short label describing the command purpose
    pub label: String,
    /// Command to run
    pub command: String,
}

/// Actionable remediation guidance for an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Suggested commands to resolve or diagnose the issue
    pub commands: Vec<RemediationCommand>,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    /// Create a new remediation with a summary
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            commands: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Add a suggested command
    #[must_use]
    pub fn command(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(RemediationCommand {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    /// Add an alternative suggestion
    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);

        if !self.commands.is_empty() {
            let _ = writeln!(output, "  Commands:");
            for cmd in &self.commands {
                let _ = writeln!(output, "    - {}: {}", cmd.label, cmd.command);
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }

        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for simscope-core
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus rows rejected at load time
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Corpus index outside `[0, N)`
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Anchor outside the candidate pool of a neighbor query
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Return remediation guidance when available.
    #[must_use]
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::Data(err) => Some(err.remediation()),
            Self::Index(_) | Self::Range(_) => Some(
                Remediation::new(
                    "An item index was outside the valid range. Re-read the corpus size and retry.",
                )
                .command("Corpus summary", "simscope inspect --corpus <rows.json>")
                .alternative("Indices are 0-based corpus positions, not display ids."),
            ),
            Self::Config(err) => Some(err.remediation()),
            Self::Io(_) => Some(
                Remediation::new("Check filesystem permissions and paths, then retry.")
                    .alternative("Verify the input file exists and is readable."),
            ),
            Self::Json(_) => Some(
                Remediation::new("Validate the JSON input and retry.")
                    .command("Validate JSON", "python -m json.tool < input.json")
                    .alternative("Check for trailing commas or invalid UTF-8."),
            ),
        }
    }
}

/// Corpus ingestion errors. Any of these aborts the load; no partial corpus is exposed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// No rows were supplied
    #[error("corpus has no rows")]
    EmptyCorpus,

    /// A required row field is absent
    #[error("row {row}: missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },

    /// A row carries a zero-length vector
    #[error("row {row}: vector is empty")]
    EmptyVector { row: usize },

    /// A row's vector length differs from the first row's
    #[error("row {row}: vector dimension {got} does not match corpus dimension {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A vector component is NaN or infinite
    #[error("row {row}: vector component {component} is not finite")]
    NonFinite { row: usize, component: usize },
}

impl DataError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::EmptyCorpus => Remediation::new("Supply at least one corpus row.")
                .alternative("Run `simscope demo` to explore the built-in sample corpus."),
            Self::MissingField { field, .. } => Remediation::new(format!(
                "Every row needs `label_text`, `vector` and `group`; add the missing `{field}`."
            )),
            Self::EmptyVector { .. } | Self::DimensionMismatch { .. } => Remediation::new(
                "All rows must carry vectors of the same, non-zero length.",
            )
            .alternative("Re-export the reduced vectors with a fixed number of components."),
            Self::NonFinite { .. } => Remediation::new(
                "Replace NaN or infinite vector components before loading.",
            ),
        }
    }
}

/// Corpus index outside `[0, N)`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("index {index} is out of range for corpus of {len} items")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// Neighbor query anchor outside the candidate pool
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("anchor {anchor} is outside a pool of {pool_size} items")]
pub struct RangeError {
    pub anchor: usize,
    pub pool_size: usize,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    #[error("Failed to parse config: {0}")]
    ParseFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::FileNotFound(path) => Remediation::new(format!(
                "Config file not found: {path}. Verify the path and retry."
            ))
            .command("Check path", format!("ls -l \"{path}\""))
            .alternative("Pass --config with the correct path."),
            Self::ReadFailed(path, _) => Remediation::new(format!(
                "Failed to read config file: {path}. Check permissions."
            ))
            .command("Check permissions", format!("ls -l \"{path}\""))
            .alternative("Ensure the file is readable by the current user."),
            Self::ParseFailed(_) => Remediation::new("Config parse failed. Fix the syntax and retry.")
                .alternative("Validate the file as TOML."),
            Self::ValidationError(_) => {
                Remediation::new("Config validation failed. Fix the invalid fields and retry.")
                    .alternative("Remove the field to fall back to its default.")
            }
        }
    }
}

/// Format an error with remediation guidance for display.
#[must_use]
pub fn format_error_with_remediation(error: &Error) -> String {
    let mut output = format!("Error: {error}");
    if let Some(remediation) = error.remediation() {
        output.push('\n');
        output.push('\n');
        output.push_str(&remediation.render_plain());
    }
    output
}
