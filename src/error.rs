use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("Unexpected token near `{excerpt}`")]
    #[diagnostic(
        code(json::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
        excerpt: String,
    },

    #[error("Unexpected end of input")]
    #[diagnostic(
        code(json::unexpected_eof),
        help("The input ended before the parser saw a complete document.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("Input ended here")]
        span: SourceSpan,
    },

    #[error("Cannot read `{path}`: {cause}")]
    #[diagnostic(
        code(json::file_read),
        help("Check that the file exists and is readable.")
    )]
    FileRead { path: String, cause: String },
}

impl ParseError {
    /// Byte offset of the offending position, when the error points into the
    /// source text.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { span, .. } | ParseError::UnexpectedEof { span, .. } => {
                Some(span.offset())
            }
            ParseError::FileRead { .. } => None,
        }
    }
}
