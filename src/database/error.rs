use std::fmt::{self, Display};

use potion::{Error, HtmlError};
use warp::reject::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or store failure on a read
    Fetch,
    /// Fetched data failed shape validation
    Parse,
    /// Insert or delete failure
    Write,
}

#[derive(Debug, Clone)]
pub struct StoreError {
    kind: ErrorKind,
    info: String,
}

impl StoreError {
    pub fn new(kind: ErrorKind, info: String) -> Self {
        Self { kind, info }
    }

    pub fn fetch(info: String) -> Self {
        Self::new(ErrorKind::Fetch, info)
    }

    pub fn parse(info: String) -> Self {
        Self::new(ErrorKind::Parse, info)
    }

    pub fn write(info: String) -> Self {
        Self::new(ErrorKind::Write, info)
    }

    /// Classifies a failed read. Rows that don't decode into the expected shape are parse errors.
    pub fn from_read(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => Self::parse(describe(value)),
            _ => Self::fetch(describe(value)),
        }
    }

    pub fn from_write(value: sqlx::Error) -> Self {
        Self::write(describe(value))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn info(&self) -> &str {
        &self.info
    }
}

fn describe(value: sqlx::Error) -> String {
    match value {
        sqlx::Error::RowNotFound => format!("RowNotFound"),
        sqlx::Error::TypeNotFound { type_name } => format!("Type not found: {type_name}"),
        sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
            format!("Column index out of bounds {index} ({len})")
        }
        sqlx::Error::ColumnDecode { index, source } => format!("Column decode {index} ({source})"),
        sqlx::Error::PoolTimedOut => format!("Pool timed out"),
        sqlx::Error::PoolClosed => format!("Pool closed"),
        sqlx::Error::WorkerCrashed => format!("Worker crashed"),
        e => format!("{e}"),
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error ({})", self.kind, self.info)
    }
}

impl std::error::Error for StoreError {}

impl Into<Error> for StoreError {
    fn into(self) -> Error {
        Error {
            code: 500,
            info: Some(self.info),
            redirect: None,
        }
    }
}

/// Missing, expired or tampered session.
#[derive(Debug, Clone)]
pub struct AuthError {
    info: String,
}

impl AuthError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid session; {}", self.info)
    }
}

impl std::error::Error for AuthError {}

impl Into<Error> for AuthError {
    fn into(self) -> Error {
        HtmlError::InvalidSession.new(&format!("Invalid session; {}", self.info))
    }
}

impl Into<Rejection> for AuthError {
    fn into(self) -> Rejection {
        let error: Error = self.into();
        error.into()
    }
}

#[derive(Debug)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Into<potion::Error> for TypeError {
    fn into(self) -> potion::Error {
        HtmlError::InvalidRequest.new(&self.info)
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}

#[derive(Debug)]
pub struct ConfigError {
    key: String,
    info: String,
}

impl ConfigError {
    pub fn new(key: &str, info: String) -> Self {
        Self {
            key: key.to_string(),
            info,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.info)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_on_reads_are_parse_errors() {
        let err = StoreError::from_read(sqlx::Error::ColumnNotFound("name".to_string()));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = StoreError::from_read(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.info(), "Pool timed out");
    }

    #[test]
    fn every_failed_write_is_a_write_error() {
        let err = StoreError::from_write(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Write);
        assert_eq!(err.to_string(), "Write error (RowNotFound)");
    }
}
