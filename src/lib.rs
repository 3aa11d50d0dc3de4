mod tools;
pub mod lzuf;

type DYNERR = Box<dyn std::error::Error>;

/// Compression Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge,
    #[error("invalid options")]
    InvalidOptions
}
