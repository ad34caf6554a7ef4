use thiserror::Error;

use crate::key_value_store::KeyspaceError;
use crate::resp::RespValue;
use crate::stream::StreamIdError;

/// Per-command failures. All of these are recoverable: the error is sent
/// as a RESP error reply and the connection keeps going.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("wrong number of arguments for '{0}'")]
    WrongArity(&'static str),
    #[error("Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("syntax error")]
    Syntax,
    #[error("{0}")]
    StreamId(#[from] StreamIdError),
}

impl From<KeyspaceError> for CommandError {
    fn from(err: KeyspaceError) -> Self {
        match err {
            KeyspaceError::WrongType => CommandError::WrongType,
            KeyspaceError::StreamId(err) => CommandError::StreamId(err),
        }
    }
}

impl CommandError {
    /// Renders the error as its wire reply. Type mismatches use the
    /// `WRONGTYPE` class; everything else is a generic `ERR`.
    pub fn as_resp(&self) -> RespValue {
        match self {
            CommandError::WrongType => RespValue::Error(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
            ),
            other => RespValue::Error(format!("ERR {}", other)),
        }
    }
}
