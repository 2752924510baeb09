//! Domain error types for the catalogue pipeline.
//!
//! Lower layers (zone/template reading, rendering) return typed
//! `thiserror` errors; the application boundary (`main.rs`,
//! `app_context.rs`) wraps them in `miette::Result` for operator-facing
//! diagnostics, matching the teacher stack's layering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoneReadError {
    #[error("unable to open zone file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TemplateReadError {
    #[error("unable to list template directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown placeholder {placeholder:?} in template {filename:?}")]
    UnknownPlaceholder {
        filename: String,
        placeholder: String,
    },
    #[error("unterminated placeholder in template {filename:?}")]
    Unterminated { filename: String },
}
