//! Error types for color labeling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for color labeling operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A palette line is not of the form `<name> <R> <G> <B>`
    #[error("Malformed palette line {line} ({content:?}): {reason}")]
    PaletteFormat {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Cannot name a color against an empty palette")]
    EmptyPalette,

    #[error("Image contains no pixels")]
    EmptyImage,

    /// `k` is zero or larger than the number of distinct colors in the image. `distinct` is only meaningful once an
    /// image has been read, so it is 0 when `k` itself is rejected.
    #[error("Invalid cluster count {}: {}", .requested, cluster_count_reason(.requested, .distinct))]
    InvalidClusterCount { requested: usize, distinct: usize },

    #[error("Failed to decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output record: {0}")]
    Output(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Another error, attributed to the file or input that caused it
    #[error("{subject}: {source}")]
    Context {
        subject: String,
        #[source]
        source: Box<Error>,
    },
}

fn cluster_count_reason(requested: &usize, distinct: &usize) -> String {
    if *requested < 1 {
        String::from("at least one cluster is required")
    } else {
        format!("image has {distinct} distinct colors")
    }
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Attribute this error to `subject`, usually a file name
    pub fn context(self, subject: impl Into<String>) -> Self {
        Self::Context {
            subject: subject.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any [`Error::Context`] layers removed
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }
}
