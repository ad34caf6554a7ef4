use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct EchoArguments {
    message: Bytes,
}

impl EchoArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongArity("ECHO"));
        }

        Ok(Self {
            message: arguments[0].clone(),
        })
    }
}

/// Handles the ECHO command: replies with the argument as a bulk string.
pub fn echo(arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::BulkString(echo_arguments.message))
}
