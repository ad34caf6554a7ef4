use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, parse_integer},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct LrangeArguments {
    key: Bytes,
    start: i64,
    stop: i64,
}

impl LrangeArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::WrongArity("LRANGE"));
        }

        Ok(Self {
            key: arguments[0].clone(),
            start: parse_integer(&arguments[1])?,
            stop: parse_integer(&arguments[2])?,
        })
    }
}

/// Handles the LRANGE command. Indices may be negative to count from the
/// end of the list; an empty window replies with an empty array.
pub async fn lrange(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let values = store_guard.lrange(
        &lrange_arguments.key,
        lrange_arguments.start,
        lrange_arguments.stop,
    )?;

    Ok(RespValue::array_of_bulks(values))
}
