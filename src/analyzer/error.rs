//! Errors raised by the document analyzer.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The parser aborted on this document; it is kept with an empty model.
    #[error("failed to parse {uri}: {message}")]
    ParseFailure { uri: Url, message: String },

    /// A query named a document that was never analyzed.
    #[error("document {0} has not been analyzed")]
    DocumentNotFound(Url),
}
