use std::{fmt, fmt::Formatter, io};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The end of a counter region lies before its start.
    InvertedRegion { start: usize, stop: usize },
    /// Exactly one bound of a counter region is null.
    PartialRegion { start: usize, stop: usize },
    /// A different region was already registered. Holds both lengths.
    AlreadyRegistered { existing: usize, rejected: usize },
    /// log4rs could not be configured
    Logging(String),
    /// Writing the probe output failed.
    IO(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvertedRegion { start, stop } => write!(
                f,
                "counter region ends before it starts: start={:#x}, stop={:#x}",
                start, stop
            ),
            Error::PartialRegion { start, stop } => write!(
                f,
                "counter region has only one null bound: start={:#x}, stop={:#x}",
                start, stop
            ),
            Error::AlreadyRegistered { existing, rejected } => write!(
                f,
                "a counter region of len {} is already registered, rejecting region of len {}",
                existing, rejected
            ),
            Error::Logging(err) => write!(f, "error while configuring logging: {}", err),
            Error::IO(err) => write!(f, "error while writing counters: {}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IO(err.to_string())
    }
}
