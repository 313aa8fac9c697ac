use std::time::Duration;

/// Reading the input stream failed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read markdown input at line {line}: {source}")]
pub struct ReadFailure {
    /// 0-based line the reader was on when the error occurred.
    pub line: usize,
    #[source]
    pub source: std::io::Error,
}

/// An internal invariant of the pipeline was violated.
///
/// These indicate a bug in the pipeline rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationFault {
    #[error("offset {offset} outside document of {total} characters ({context})")]
    OffsetOutOfRange {
        offset: usize,
        total: usize,
        context: String,
    },
    #[error("unrecognized structural node kind: {kind}")]
    UnknownNode { kind: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadFailure),
    /// The structural parser ran past its budget. Distinct from malformed
    /// input: the document was too large or pathological to parse in time.
    #[error("Structural parse timed out after {budget:?}")]
    StructuralTimeout { budget: Duration },
    #[error("Structural parser failed: {0}")]
    StructuralCrash(String),
    #[error("Serialization fault: {0}")]
    Serialization(#[from] SerializationFault),
    #[error("Parse cancelled")]
    Cancelled,
}
