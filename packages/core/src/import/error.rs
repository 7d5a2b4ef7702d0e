use crate::db::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing a transit dataset
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset '{path}' is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Import step '{step}' failed: {source}")]
    Store {
        step: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    pub fn store(step: &'static str, source: StoreError) -> Self {
        Self::Store { step, source }
    }
}
