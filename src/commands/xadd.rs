use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    stream::StreamIdSpec,
};

pub struct XaddArguments {
    key: Bytes,
    id: StreamIdSpec,
    fields: Vec<(Bytes, Bytes)>,
}

impl XaddArguments {
    /// Accepts `XADD key id field value [field value ...]`. The id must be
    /// `<ms>-<seq>` or `<ms>-*`, and at least one field pair is required.
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() < 4 || arguments[2..].len() % 2 != 0 {
            return Err(CommandError::WrongArity("XADD"));
        }

        let id = StreamIdSpec::parse(&arguments[1])?;

        let fields = arguments[2..]
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self {
            key: arguments[0].clone(),
            id,
            fields,
        })
    }
}

/// Handles the XADD command: validates the entry id against the stream's
/// top item, appends, and replies with the assigned id as a bulk string.
pub async fn xadd(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let id = store_guard.xadd(xadd_arguments.key, xadd_arguments.id, xadd_arguments.fields)?;

    Ok(RespValue::BulkString(Bytes::from(id.to_string())))
}
