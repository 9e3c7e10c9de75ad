use std::fmt;

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
}

/// The kind of an error that can occur.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Io(std::io::Error),
    Parse(ini::ParseError),
    MissingSection(&'static str),
    MissingKey(&'static str),
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::Parse(ref err) => err.fmt(f),
            ErrorKind::MissingSection(section) => {
                write!(f, "missing configuration section: [{}]", section)
            }
            ErrorKind::MissingKey(key) => write!(f, "missing configuration key: {}", key),
            ErrorKind::InvalidValue { key, ref value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl From<ini::Error> for Error {
    fn from(e: ini::Error) -> Self {
        match e {
            ini::Error::Io(err) => Error {
                kind: ErrorKind::Io(err),
            },
            ini::Error::Parse(err) => Error {
                kind: ErrorKind::Parse(err),
            },
        }
    }
}
