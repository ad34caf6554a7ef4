use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct PushArguments {
    key: Bytes,
    values: Vec<Bytes>,
}

impl PushArguments {
    pub fn parse(arguments: Vec<Bytes>, prepend: bool) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArity(if prepend {
                "LPUSH"
            } else {
                "RPUSH"
            }));
        }

        Ok(Self {
            key: arguments[0].clone(),
            values: arguments[1..].to_vec(),
        })
    }
}

/// Handles the RPUSH command: appends the values in argument order and
/// replies with the new list length.
pub async fn rpush(
    store: &Arc<Mutex<KeyValueStore>>,
    state: &Arc<Mutex<State>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    push_and_hand_off(store, state, arguments, false).await
}

/// Handles the LPUSH command: inserts each value at the head in
/// left-to-right order and replies with the new list length.
pub async fn lpush(
    store: &Arc<Mutex<KeyValueStore>>,
    state: &Arc<Mutex<State>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    push_and_hand_off(store, state, arguments, true).await
}

/// Shared push path for both commands.
///
/// The push and the wake-up of blocked BLPOP clients happen while both the
/// store and the coordinator locks are held (always acquired in that
/// order), so no other task can observe the list grown and a waiter still
/// parked. The reply carries the length right after the push, before any
/// hand-off shrinks the list.
async fn push_and_hand_off(
    store: &Arc<Mutex<KeyValueStore>>,
    state: &Arc<Mutex<State>>,
    arguments: Vec<Bytes>,
    prepend: bool,
) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, prepend)?;

    let mut store_guard = store.lock().await;
    let new_length = store_guard.push(
        push_arguments.key.clone(),
        push_arguments.values,
        prepend,
    )?;

    let mut state_guard = state.lock().await;

    if state_guard.has_waiters(&push_arguments.key) {
        if let Some(list) = store_guard.list_mut(&push_arguments.key) {
            state_guard.hand_off(&push_arguments.key, list);
        }

        store_guard.remove_if_drained(&push_arguments.key);
    }

    Ok(RespValue::Integer(new_length as i64))
}
