use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, parse_integer},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct SetArguments {
    key: Bytes,
    value: Bytes,
    ttl: Option<Duration>,
}

impl SetArguments {
    /// Accepts `SET key value` and `SET key value PX <milliseconds>`.
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 2 && arguments.len() != 4 {
            return Err(CommandError::WrongArity("SET"));
        }

        let mut ttl = None;

        if arguments.len() == 4 {
            if !arguments[2].eq_ignore_ascii_case(b"PX") {
                return Err(CommandError::Syntax);
            }

            let milliseconds = parse_integer(&arguments[3])?;

            if milliseconds < 0 {
                return Err(CommandError::NotAnInteger);
            }

            ttl = Some(Duration::from_millis(milliseconds as u64));
        }

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            ttl,
        })
    }
}

/// Handles the SET command: stores the string, overwriting any prior value
/// of any type at the key.
pub async fn set(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    store_guard.set_string(set_arguments.key, set_arguments.value, set_arguments.ttl);

    Ok(RespValue::SimpleString("OK".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let wrong_arity = SetArguments::parse(vec![Bytes::from("k")]);
        assert_eq!(wrong_arity.err(), Some(CommandError::WrongArity("SET")));

        let three_args =
            SetArguments::parse(vec![Bytes::from("k"), Bytes::from("v"), Bytes::from("PX")]);
        assert_eq!(three_args.err(), Some(CommandError::WrongArity("SET")));

        let unknown_option = SetArguments::parse(vec![
            Bytes::from("k"),
            Bytes::from("v"),
            Bytes::from("EX"),
            Bytes::from("100"),
        ]);
        assert_eq!(unknown_option.err(), Some(CommandError::Syntax));

        let bad_expiry = SetArguments::parse(vec![
            Bytes::from("k"),
            Bytes::from("v"),
            Bytes::from("PX"),
            Bytes::from("soon"),
        ]);
        assert_eq!(bad_expiry.err(), Some(CommandError::NotAnInteger));

        let negative_expiry = SetArguments::parse(vec![
            Bytes::from("k"),
            Bytes::from("v"),
            Bytes::from("PX"),
            Bytes::from("-5"),
        ]);
        assert_eq!(negative_expiry.err(), Some(CommandError::NotAnInteger));
    }

    #[test]
    fn test_parse_px_is_case_insensitive() {
        let parsed = SetArguments::parse(vec![
            Bytes::from("k"),
            Bytes::from("v"),
            Bytes::from("px"),
            Bytes::from("100"),
        ])
        .unwrap();

        assert_eq!(parsed.ttl, Some(Duration::from_millis(100)));
    }
}
