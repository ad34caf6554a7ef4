use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

/// Handles the FLUSHDB command.
///
/// Removes every key and drains the blocking coordinator; parked BLPOP
/// clients wake empty-handed and reply with a null array. Both locks are
/// taken in the usual store-then-state order so the wipe is one step.
pub async fn flushdb(
    store: &Arc<Mutex<KeyValueStore>>,
    state: &Arc<Mutex<State>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    if !arguments.is_empty() {
        return Err(CommandError::WrongArity("FLUSHDB"));
    }

    let mut store_guard = store.lock().await;
    store_guard.flush();

    let mut state_guard = state.lock().await;
    state_guard.drain();

    Ok(RespValue::SimpleString("OK".to_string()))
}
