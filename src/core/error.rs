//! Error handling for agpm-sync
//!
//! Only a handful of failures stop a sync run: a root directory that cannot
//! be read, a manifest that cannot be read or parsed, an invalid
//! configuration, or generated output that fails to re-parse. Everything
//! else (missing or malformed frontmatter, placeholder paths, dangling
//! references) is a [`Diagnostic`](crate::core::Diagnostic) and never an
//! error.
//!
//! The error system mirrors the rest of the crate's CLI conventions:
//! - [`SyncError`] - strongly-typed failure cases
//! - [`ErrorContext`] - wrapper adding details and an actionable suggestion
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for display
//!
//! # Examples
//!
//! ```rust,no_run
//! use agpm_sync::core::{SyncError, user_friendly_error};
//!
//! let error = SyncError::RootUnreadable {
//!     root: "claude-code/agents".to_string(),
//!     reason: "permission denied".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(error)).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Fatal failures of a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A scan root exists but cannot be listed.
    ///
    /// This is the only I/O failure during scanning that halts the pipeline;
    /// a root that does not exist at all simply yields no artifacts.
    #[error("Cannot read artifact root '{root}': {reason}")]
    RootUnreadable {
        /// Root-relative directory that failed.
        root: String,
        /// Underlying reason.
        reason: String,
    },

    /// An enumerated artifact file could not be read.
    #[error("Cannot read artifact '{path}': {reason}")]
    ArtifactUnreadable {
        /// Root-relative path of the artifact.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// The existing manifest could not be read.
    #[error("Failed to read manifest '{path}': {reason}")]
    ManifestReadFailed {
        /// Manifest path.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// The existing manifest is not valid TOML.
    #[error("Invalid manifest file syntax in '{file}'")]
    ManifestParseError {
        /// Manifest path.
        file: String,
        /// Parser message.
        reason: String,
    },

    /// The regenerated manifest failed to re-parse. Nothing is written.
    #[error("Generated manifest is not valid TOML: {reason}")]
    GeneratedManifestInvalid {
        /// Parser message.
        reason: String,
    },

    /// The manifest on disk differs from what a sync would produce.
    #[error("Manifest '{path}' is out of date")]
    ManifestOutOfDate {
        /// Manifest path.
        path: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error.
        message: String,
    },

    /// A configured scan pattern is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob parser message.
        reason: String,
    },
}

/// An error plus optional details and suggestion for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// Headline message.
    pub message: String,
    /// Optional suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Optional additional details about the error.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only a headline message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: red headline, yellow details, green suggestion.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion.
///
/// [`SyncError`] variants anywhere in the error chain get tailored advice;
/// other errors are shown with their full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sync_error) = error.chain().find_map(|e| e.downcast_ref::<SyncError>()) {
        return create_error_context(sync_error, &error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(error.to_string())
            .with_suggestion("Check file ownership and permissions in the repository");
    }

    let mut context = ErrorContext::new(error.to_string());
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !causes.is_empty() {
        context = context.with_details(causes.join(": "));
    }
    context
}

fn create_error_context(sync_error: &SyncError, error: &anyhow::Error) -> ErrorContext {
    let context = ErrorContext::new(error.to_string());
    match sync_error {
        SyncError::RootUnreadable { .. } | SyncError::ArtifactUnreadable { .. } => context
            .with_details(sync_error.to_string())
            .with_suggestion("Check directory permissions, or remove the pattern from agpm-sync.toml"),
        SyncError::ManifestReadFailed { .. } => context
            .with_details(sync_error.to_string())
            .with_suggestion("Check that the manifest path in agpm-sync.toml is correct"),
        SyncError::ManifestParseError { reason, .. } => context
            .with_details(reason.clone())
            .with_suggestion("Fix the TOML syntax error before re-running the sync"),
        SyncError::GeneratedManifestInvalid { reason } => context
            .with_details(reason.clone())
            .with_suggestion("The manifest was left untouched; check artifact names for unusual characters"),
        SyncError::ManifestOutOfDate { .. } => {
            context.with_suggestion("Run 'agpm-sync sync' and commit the updated manifest")
        }
        SyncError::ConfigError { .. } | SyncError::InvalidGlobPattern { .. } => {
            context.with_suggestion("Check agpm-sync.toml against the documented configuration keys")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let error = SyncError::RootUnreadable {
            root: "claude-code/agents".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot read artifact root 'claude-code/agents': permission denied"
        );

        let error = SyncError::ManifestOutOfDate {
            path: "examples/deps/agpm.toml".to_string(),
        };
        assert_eq!(error.to_string(), "Manifest 'examples/deps/agpm.toml' is out of date");
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_sync_error() {
        let result: anyhow::Result<()> = Err(SyncError::ManifestParseError {
            file: "agpm.toml".to_string(),
            reason: "expected `]`".to_string(),
        })
        .context("Failed to synchronize manifest");

        let ctx = user_friendly_error(result.unwrap_err());
        assert_eq!(ctx.message, "Failed to synchronize manifest");
        assert_eq!(ctx.details.as_deref(), Some("expected `]`"));
        assert!(ctx.suggestion.unwrap().contains("TOML syntax"));
    }

    #[test]
    fn test_user_friendly_error_generic() {
        let error = anyhow::anyhow!("inner").context("outer");
        let ctx = user_friendly_error(error);
        assert_eq!(ctx.message, "outer");
        assert_eq!(ctx.details.as_deref(), Some("inner"));
        assert!(ctx.suggestion.is_none());
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new("boom").with_details("why").with_suggestion("fix it");
        assert_eq!(ctx.to_string(), "boom\nDetails: why\nSuggestion: fix it");
    }
}
