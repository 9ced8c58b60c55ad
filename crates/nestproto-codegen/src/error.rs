use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Everything that can abort a generation run.
///
/// None of these are recovered locally: the plugin is a single-shot batch
/// transform and any failure means no response is written.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A field or method references a fully qualified type that no input file declares.
    #[error("Type '{0}' was not found in the type map")]
    UnresolvedType(String),

    /// The descriptor set violates the compiler-input contract.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("\"{key}\" parameter must be specified e.g. --ts_proto_opt={key}={example}")]
    MissingParameter {
        key: &'static str,
        example: &'static str,
    },

    #[error("failed to parse services file {}: {source}", path.display())]
    ServicesFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode CodeGeneratorRequest: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("failed to encode CodeGeneratorResponse: {0}")]
    Encode(#[from] prost::EncodeError),
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor(message.into())
    }
}
