//! Unified error type.

use std::fmt;

/// The error type returned by hitch's fallible operations.
///
/// "No route matched" and "no such param" are not errors: the first becomes
/// the fallback (or a 404 [`Response`](crate::Response)), the second an empty
/// value. This type surfaces infrastructure failures: binding a port,
/// accepting a connection, or a route pattern the router refuses.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Route(matchit::InsertError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)    => write!(f, "io: {e}"),
            Self::Route(e) => write!(f, "route: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)    => Some(e),
            Self::Route(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<matchit::InsertError> for Error {
    fn from(e: matchit::InsertError) -> Self {
        Self::Route(e)
    }
}
