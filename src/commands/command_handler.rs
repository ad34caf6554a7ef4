use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{
        blpop::blpop,
        command_error::CommandError,
        echo::echo,
        flushdb::flushdb,
        get::get,
        llen::llen,
        lpop::lpop,
        lrange::lrange,
        rpush_and_lpush::{lpush, rpush},
        set::set,
        type_command::type_command,
        xadd::xadd,
    },
    key_value_store::KeyValueStore,
    resp::{RespError, RespValue},
    state::State,
};

/// A normalized request: the command name uppercased at the boundary, the
/// arguments kept byte-exact.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<Bytes>,
}

impl CommandHandler {
    /// Builds a handler from a decoded frame. Requests must be non-empty
    /// arrays of bulk strings; anything else is a protocol violation and
    /// terminates the connection.
    pub fn new(input: RespValue) -> Result<Self, RespError> {
        let RespValue::Array(elements) = input else {
            return Err(RespError::MalformedRequest);
        };

        let mut bulks = Vec::with_capacity(elements.len());

        for element in elements {
            let RespValue::BulkString(bulk) = element else {
                return Err(RespError::MalformedRequest);
            };
            bulks.push(bulk);
        }

        if bulks.is_empty() {
            return Err(RespError::MalformedRequest);
        }

        let name = String::from_utf8_lossy(&bulks[0]).to_uppercase();
        let arguments = bulks.split_off(1);

        Ok(Self { name, arguments })
    }

    /// Executes the command against the shared keyspace and coordinator,
    /// producing the reply value. Unknown names and argument problems come
    /// back as `CommandError`, which the connection turns into an error
    /// reply without dropping the client.
    pub async fn handle_command(
        &self,
        store: &Arc<Mutex<KeyValueStore>>,
        state: &Arc<Mutex<State>>,
    ) -> Result<RespValue, CommandError> {
        match self.name.as_str() {
            "PING" => {
                if !self.arguments.is_empty() {
                    return Err(CommandError::WrongArity("PING"));
                }

                Ok(RespValue::SimpleString("PONG".to_string()))
            }
            "COMMAND" => Ok(RespValue::Array(Vec::new())),
            "ECHO" => echo(self.arguments.clone()),
            "GET" => get(store, self.arguments.clone()).await,
            "SET" => set(store, self.arguments.clone()).await,
            "TYPE" => type_command(store, self.arguments.clone()).await,
            "RPUSH" => rpush(store, state, self.arguments.clone()).await,
            "LPUSH" => lpush(store, state, self.arguments.clone()).await,
            "LRANGE" => lrange(store, self.arguments.clone()).await,
            "LLEN" => llen(store, self.arguments.clone()).await,
            "LPOP" => lpop(store, self.arguments.clone()).await,
            "BLPOP" => blpop(store, state, self.arguments.clone()).await,
            "XADD" => xadd(store, self.arguments.clone()).await,
            "FLUSHDB" => flushdb(store, state, self.arguments.clone()).await,
            _ => Err(CommandError::UnknownCommand(self.name.clone())),
        }
    }
}
