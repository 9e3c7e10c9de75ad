use mongodb::error::{ErrorKind as MongoErrorKind, WriteFailure};
use std::fmt;
use std::sync::PoisonError;

// Server code for E11000 duplicate key error.
const MONGO_DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True when a unique index rejected the write, whichever backend raised it.
    pub fn is_duplicate_key(&self) -> bool {
        match self.kind {
            ErrorKind::DuplicateKey { .. } => true,
            ErrorKind::Mongo(ref err) => match *err.kind {
                MongoErrorKind::Write(WriteFailure::WriteError(ref e)) => {
                    e.code == MONGO_DUPLICATE_KEY_CODE
                }
                MongoErrorKind::Command(ref e) => e.code == MONGO_DUPLICATE_KEY_CODE,
                _ => false,
            },
            _ => false,
        }
    }
}

/// The kind of an error that can occur.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    UnsupportedUri(String),
    DuplicateKey { field: String, value: String },
    NotADocument,
    LockPoisoned,
    Mongo(mongodb::error::Error),
    Bson(mongodb::bson::ser::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::UnsupportedUri(ref scheme) => {
                write!(f, "unsupported store uri scheme: {}", scheme)
            }
            ErrorKind::DuplicateKey {
                ref field,
                ref value,
            } => write!(f, "duplicate key error: {{ {}: {} }}", field, value),
            ErrorKind::NotADocument => write!(f, "response body is not a JSON object"),
            ErrorKind::LockPoisoned => write!(f, "a task failed while holding the store lock"),
            ErrorKind::Mongo(ref err) => err.fmt(f),
            ErrorKind::Bson(ref err) => err.fmt(f),
        }
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Self {
        Error {
            kind: ErrorKind::Mongo(e),
        }
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        Error {
            kind: ErrorKind::Bson(e),
        }
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error {
            kind: ErrorKind::LockPoisoned,
        }
    }
}
