use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required member (e.g. `content.xml`) is missing from the archive.
    #[error("missing archive member: {0}")]
    NotFound(String),

    #[error("corrupt archive: {0}")]
    Corrupt(String),

    #[error("malformed XML: {0}")]
    MalformedInput(#[from] roxmltree::Error),

    #[error("cannot find office:text node")]
    MissingTextRoot,

    /// A chapter reference that is not `"<BOOK> <number>"`.
    #[error("bad chapter reference: {0:?}")]
    BadReference(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid rewrite pattern: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
