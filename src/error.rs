//! Rich diagnostic error types for interop-eval.
//!
//! The search core never fails: exhaustion is a `false` outcome and malformed
//! graph regions read as empty. Errors only come from the surfaces around it
//! (model files, configuration, output), each with its own miette-annotated
//! enum so users get an error code and a hint.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for interop-eval.
#[derive(Debug, Error, Diagnostic)]
pub enum InteropError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Output(#[from] OutputError),
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("failed to read model file: {path}")]
    #[diagnostic(
        code(interop::model::read),
        help("Check that the model file exists in the output directory and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model document: {message}")]
    #[diagnostic(
        code(interop::model::parse),
        help(
            "The model must be a JSON document with `entities` and `associations` arrays. \
             Every entity needs a `name` and a `kind` (Actor, Carrier, Language, \
             Translation, Address, CommunicationNeed)."
        )
    )]
    Parse { message: String },

    #[error("duplicate entity name: \"{name}\"")]
    #[diagnostic(
        code(interop::model::duplicate),
        help("Entity names identify association ends and must be unique across all packages.")
    )]
    DuplicateEntity { name: String },

    #[error("failed to write model file: {path}")]
    #[diagnostic(
        code(interop::model::write),
        help("Ensure the output directory is writable and the disk is not full.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize model document: {message}")]
    #[diagnostic(code(interop::model::serialize))]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("no such directory: {path}")]
    #[diagnostic(
        code(interop::config::missing_dir),
        help("Pass the directory holding the model file as the single positional argument.")
    )]
    MissingDir { path: String },

    #[error("not a directory: {path}")]
    #[diagnostic(
        code(interop::config::not_a_dir),
        help("The argument must be a directory, not the model file itself.")
    )]
    NotADirectory { path: String },

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(interop::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(interop::config::parse),
        help("Check the TOML syntax and field names in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(code(interop::config::serialize))]
    Serialize { message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(interop::config::write),
        help("Ensure the output directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config value: {message}")]
    #[diagnostic(code(interop::config::invalid))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OutputError {
    #[error("failed to write {path}")]
    #[diagnostic(
        code(interop::output::write),
        help("Ensure the output directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {message}")]
    #[diagnostic(code(interop::output::serialize))]
    Serialize { message: String },
}

/// Convenience result alias for the crate.
pub type InteropResult<T> = std::result::Result<T, InteropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_wraps_transparently() {
        let err: InteropError = ModelError::DuplicateEntity {
            name: "PLC".into(),
        }
        .into();
        assert_eq!(err.to_string(), "duplicate entity name: \"PLC\"");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("interop::model::duplicate"));
    }

    #[test]
    fn config_error_has_help() {
        let err = ConfigError::MissingDir {
            path: "/nowhere".into(),
        };
        assert!(err.help().is_some());
        assert!(err.to_string().contains("/nowhere"));
    }
}
