use crate::external::CommandError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a diff engine operation.
#[derive(Debug, Error)]
pub enum GhostError {
    /// The tool could not be started, or ran and exited non-zero.
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid revision '{revision}'")]
    InvalidRevision { revision: String },
    #[error(transparent)]
    Aggregate(AggregateError),
    /// Operation context around a lower-level failure.
    #[error("{operation} failed (dir: {}, artifact: {}): {source}", dir.display(), artifact.display())]
    Operation {
        operation: &'static str,
        dir: PathBuf,
        artifact: PathBuf,
        #[source]
        source: Box<GhostError>,
    },
}

impl GhostError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GhostError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn context(
        self,
        operation: &'static str,
        dir: impl Into<PathBuf>,
        artifact: impl Into<PathBuf>,
    ) -> Self {
        GhostError::Operation {
            operation,
            dir: dir.into(),
            artifact: artifact.into(),
            source: Box::new(self),
        }
    }

    /// Leaf causes in order, with context wrappers and aggregates flattened.
    pub fn causes(&self) -> Vec<&GhostError> {
        match self {
            GhostError::Operation { source, .. } => source.causes(),
            GhostError::Aggregate(agg) => agg.iter().flat_map(GhostError::causes).collect(),
            leaf => vec![leaf],
        }
    }

    /// Exit status when the underlying failure is a non-zero exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GhostError::Command(e) => e.status_code(),
            GhostError::Operation { source, .. } => source.exit_code(),
            _ => None,
        }
    }
}

/// Ordered collection of independent failures from one logical operation.
#[derive(Debug, Default)]
pub struct AggregateError {
    causes: Vec<GhostError>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: impl Into<GhostError>) {
        self.causes.push(err.into());
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GhostError> {
        self.causes.iter()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), GhostError> {
        if self.causes.is_empty() {
            Ok(())
        } else {
            Err(GhostError::Aggregate(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.causes.len() == 1 {
            writeln!(f, "1 error occurred:")?;
        } else {
            writeln!(f, "{} errors occurred:", self.causes.len())?;
        }
        for cause in &self.causes {
            writeln!(f, "\t* {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl IntoIterator for AggregateError {
    type Item = GhostError;
    type IntoIter = std::vec::IntoIter<GhostError>;

    fn into_iter(self) -> Self::IntoIter {
        self.causes.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a GhostError;
    type IntoIter = std::slice::Iter<'a, GhostError>;

    fn into_iter(self) -> Self::IntoIter {
        self.causes.iter()
    }
}
