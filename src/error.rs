//! Error types for the fifo engine.
//!
//! Every error maps onto the negative POSIX error number the host framework
//! expects from a plugin callback, see [`Error::errno`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// One of the sink handles has already been released
    #[error("fifo descriptor is not open")]
    BadDescriptor,

    /// The sink refused data, or the stream hit an overrun
    #[error("broken pipe")]
    BrokenPipe,

    #[error("out of memory")]
    OutOfMemory,

    /// Protocol violation by the caller, nothing was changed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Input file could not be decoded
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Negative POSIX error number for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::BadDescriptor => -libc::EBADFD,
            Error::BrokenPipe => -libc::EPIPE,
            Error::OutOfMemory => -libc::ENOMEM,
            Error::InvalidArgument(_) | Error::Config(_) | Error::Toml(_) | Error::Wav(_) => {
                -libc::EINVAL
            }
            Error::Io { source, .. } => -source.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}
