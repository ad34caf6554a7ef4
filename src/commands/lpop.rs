use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, parse_integer},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct LpopArguments {
    key: Bytes,
    count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(CommandError::WrongArity("LPOP"));
        }

        let count = match arguments.get(1) {
            Some(raw) => {
                let count = parse_integer(raw)?;

                if count < 0 {
                    return Err(CommandError::NotAnInteger);
                }

                Some(count as usize)
            }
            None => None,
        };

        Ok(Self {
            key: arguments[0].clone(),
            count,
        })
    }
}

/// Handles the LPOP command.
///
/// Without a count the reply is the removed head as a bulk string, or a
/// null bulk when the list is absent or empty. With a count the reply is an
/// array of up to `count` removed heads; a count of 0 against an existing
/// list gives an empty array, while an absent or empty list stays a null
/// bulk.
pub async fn lpop(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;

    match lpop_arguments.count {
        None => match store_guard.pop_front(&lpop_arguments.key)? {
            Some(value) => Ok(RespValue::BulkString(value)),
            None => Ok(RespValue::NullBulkString),
        },
        Some(count) => {
            if store_guard.llen(&lpop_arguments.key)? == 0 {
                return Ok(RespValue::NullBulkString);
            }

            let mut popped = Vec::with_capacity(count);

            for _ in 0..count {
                match store_guard.pop_front(&lpop_arguments.key)? {
                    Some(value) => popped.push(value),
                    None => break,
                }
            }

            Ok(RespValue::array_of_bulks(popped))
        }
    }
}
