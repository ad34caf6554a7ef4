mod blpop;
mod command_error;
mod command_handler;
mod echo;
mod flushdb;
mod get;
mod llen;
mod lpop;
mod lrange;
mod rpush_and_lpush;
mod set;
mod type_command;
mod xadd;

pub use command_error::CommandError;
pub use command_handler::CommandHandler;

use crate::resp::RespValue;

/// Parses a decimal integer argument, rejecting anything that is not a
/// plain base-10 number.
pub(crate) fn parse_integer(argument: &[u8]) -> Result<i64, CommandError> {
    let text = str::from_utf8(argument).map_err(|_| CommandError::NotAnInteger)?;

    text.parse::<i64>().map_err(|_| CommandError::NotAnInteger)
}

/// The `[key, value]` reply shape shared by the blocking pop paths.
pub(crate) fn key_value_reply(key: bytes::Bytes, value: bytes::Bytes) -> RespValue {
    RespValue::Array(vec![
        RespValue::BulkString(key),
        RespValue::BulkString(value),
    ])
}
