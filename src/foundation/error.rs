/// Convenience result type used across storyreel.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Unusable configuration document (bad style values, stale manifest, no scenes).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A cue that could not be placed on the timeline.
    #[error("scheduling error: {0}")]
    Scheduling(String),

    /// An external collaborator (speech or script service) failed.
    #[error("dependency error: {service} failed{}: {body}", fmt_status(.status))]
    Dependency {
        /// Collaborator name, e.g. `speech`.
        service: String,
        /// HTTP-level status when the service answered.
        status: Option<u16>,
        /// Response body or transport error text.
        body: String,
    },

    /// Errors while evaluating schedule state for a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors with path context.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`StoryError::Scheduling`] value.
    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    /// Build a [`StoryError::Dependency`] value.
    pub fn dependency(
        service: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        Self::Dependency {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    /// Build a [`StoryError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`StoryError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" [{s}]")).unwrap_or_default()
}

/// Category of a recoverable problem that was handled by omission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Scene skipped because of a broken reference or value.
    Configuration,
    /// Cue dropped or overridden.
    Scheduling,
}

/// A recoverable problem recorded while building a timeline or schedule.
///
/// The offending unit has already been dropped; everything else keeps its timing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    /// Problem category.
    pub kind: DiagnosticKind,
    /// Index of the scene in the configuration document, when scene-scoped.
    pub scene: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn configuration(scene: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Configuration,
            scene,
            message: message.into(),
        }
    }

    pub(crate) fn scheduling(scene: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Scheduling,
            scene,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
