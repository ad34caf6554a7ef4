use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Handles the GET command.
///
/// Replies with the string stored at the key, a null bulk when the key is
/// absent or has expired, and `WRONGTYPE` when the key holds a list or a
/// stream. An expired entry is deleted by this read.
pub async fn get(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArity("GET"));
    }

    let mut store_guard = store.lock().await;

    match store_guard.get_string(&arguments[0])? {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
