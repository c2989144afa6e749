use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::Namespace;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("no {namespace} identifier registered for {ref_path} in {file}")]
    MissingIdentifier {
        ref_path: String,
        namespace: Namespace,
        file: String,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
