/// Convenience result type used across cuecast.
pub type CuecastResult<T> = Result<T, CuecastError>;

/// Top-level error taxonomy used by compiler and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum CuecastError {
    /// Invalid request, configuration or command specification.
    #[error("validation error: {0}")]
    Validation(String),

    /// Word-wrap configuration that cannot be applied (e.g. glyph/replacement arity mismatch).
    #[error("layout config error: {0}")]
    LayoutConfig(String),

    /// Duration lookup failed for a single media asset.
    #[error("probe error: {0}")]
    Probe(String),

    /// The external renderer exited unsuccessfully or could not be started.
    #[error("render invocation failed ({status}): {output}")]
    Render {
        /// Exit status description.
        status: String,
        /// Combined stdout/stderr captured from the renderer.
        output: String,
    },

    /// A compiled graph broke the input-port/label alignment contract. Always a bug.
    #[error("graph invariant violated: {0}")]
    Invariant(String),

    /// Operation present in the command surface but deliberately not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CuecastError {
    /// Build a [`CuecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CuecastError::LayoutConfig`] value.
    pub fn layout_config(msg: impl Into<String>) -> Self {
        Self::LayoutConfig(msg.into())
    }

    /// Build a [`CuecastError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`CuecastError::Render`] value.
    pub fn render(status: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Render {
            status: status.into(),
            output: output.into(),
        }
    }

    /// Build a [`CuecastError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`CuecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the pipeline may continue after this error.
    ///
    /// Only probe failures are recoverable; everything else ends the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Probe(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
