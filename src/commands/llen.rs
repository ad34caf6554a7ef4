use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Handles the LLEN command: the list length, or 0 for an absent key.
pub async fn llen(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArity("LLEN"));
    }

    let mut store_guard = store.lock().await;
    let length = store_guard.llen(&arguments[0])?;

    Ok(RespValue::Integer(length as i64))
}
