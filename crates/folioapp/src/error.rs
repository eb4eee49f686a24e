//! # Errors
//!
//! Every failure surfaced by folio belongs to one of three kinds, each carrying
//! the HTTP status a request handler should answer with:
//!
//! | Kind              | Status | Raised for                                              |
//! |-------------------|--------|---------------------------------------------------------|
//! | `InvalidArgument` | 400    | non-positive page id, empty block name, bad request body |
//! | `NotFound`        | 404    | unknown page, block outside the blocks directory or missing |
//! | `StorageFailure`  | 500    | directory creation, JSON write, unreadable blocks dir, file read |
//!
//! Errors are raised where they are detected. Nothing in the library retries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Invalid page id: {0}")]
    InvalidPageId(i64),

    #[error("Block name must not be empty")]
    EmptyBlockName,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Page not found: {0}")]
    PageNotFound(u64),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    StorageFailure,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::StorageFailure => 500,
        }
    }
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::InvalidPageId(_) | FolioError::EmptyBlockName | FolioError::BadRequest(_) => {
                ErrorKind::InvalidArgument
            }
            FolioError::PageNotFound(_) | FolioError::BlockNotFound(_) => ErrorKind::NotFound,
            FolioError::Storage(_)
            | FolioError::Config(_)
            | FolioError::Io(_)
            | FolioError::Serialization(_) => ErrorKind::StorageFailure,
        }
    }

    /// HTTP status the caller should surface for this error.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
