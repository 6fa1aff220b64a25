use thiserror::Error;

/// Errors produced while building or writing a chart document.
///
/// A render call either writes its one output file or fails with no file
/// written; there is no partial success.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The request referenced something the dataset cannot satisfy
    /// (unknown column, unparseable value, malformed input shape).
    #[error("configuration error: {0}")]
    Config(String),

    /// The output document could not be written or the input source read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Shorthand for a `Config` error built from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        RenderError::Config(msg.into())
    }
}

impl From<csv::Error> for RenderError {
    fn from(err: csv::Error) -> Self {
        let msg = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => RenderError::Io(io_err),
            _ => RenderError::Config(format!("malformed csv: {}", msg)),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        if err.classify() == serde_json::error::Category::Io {
            RenderError::Io(err.into())
        } else {
            RenderError::Config(format!("malformed json: {}", err))
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
