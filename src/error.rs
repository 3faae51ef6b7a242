use std::{io, path::PathBuf};

/// Failures of the persistence layer (records, peak tables and configurations on disk)
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("failed to access {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("failed to (de)serialize JSON")]
    Json(#[from] serde_json::Error),
    #[error("failed to write the CSV file")]
    Csv(#[from] csv::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid element count range: min_elements={min}, max_elements={max}")]
    InvalidRange { min: usize, max: usize },
    #[error("cannot normalize a composition with fractions summing to zero")]
    DegenerateComposition,
    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("persistence error")]
    Persist(#[from] PersistError),
}
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Persist(value.into())
    }
}
impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Persist(value.into())
    }
}
