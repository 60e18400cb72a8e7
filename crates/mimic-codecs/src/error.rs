use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Not form URL-encoded data: {0}")]
    Form(String),

    #[error("Not an HTTP message: {0}")]
    Http(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Unsupported format: {0}")]
    Unsupported(String),
}
