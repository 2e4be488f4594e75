use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Input errors
    #[error("PRG input too short: {0} bytes (a load address needs 2)")]
    InputTooShort(usize),

    #[error("in-place crunching needs at least one source byte")]
    EmptySource,

    // Configuration errors
    #[error("invalid jump address {0:?}")]
    InvalidJumpAddress(String),

    #[error("self-extracting output requires a jump address")]
    MissingJumpAddress,

    #[error("in-place crunching cannot be combined with a self-extractor")]
    SfxWithInPlace,

    #[error("boot variant selection requires self-extracting output")]
    SfxModeWithoutSfx,

    // Internal errors
    #[error("edge map is corrupt: no path from source to sink")]
    UnreachableSink,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
