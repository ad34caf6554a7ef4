use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Handles the TYPE command: replies with `string`, `list`, `stream`, or
/// `none` for an absent or expired key.
pub async fn type_command(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArity("TYPE"));
    }

    let mut store_guard = store.lock().await;
    let type_name = store_guard.type_of(&arguments[0]);

    Ok(RespValue::SimpleString(type_name.to_string()))
}
