use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::sync::{oneshot, Mutex};

use crate::{
    commands::{command_error::CommandError, key_value_reply},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct BlpopArguments {
    key: Bytes,
    /// `None` means block until a value arrives.
    timeout: Option<Duration>,
}

impl BlpopArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::WrongArity("BLPOP"));
        }

        Ok(Self {
            key: arguments[0].clone(),
            timeout: parse_timeout(&arguments[1])?,
        })
    }
}

/// Parses the BLPOP timeout argument.
///
/// An integer is whole seconds, with 0 meaning wait forever. A value
/// containing a decimal point is fractional seconds, truncated to whole
/// milliseconds. Anything negative or unparsable is rejected.
fn parse_timeout(argument: &[u8]) -> Result<Option<Duration>, CommandError> {
    let text = str::from_utf8(argument).map_err(|_| CommandError::InvalidTimeout)?;

    if text.contains('.') {
        let seconds = text
            .parse::<f64>()
            .map_err(|_| CommandError::InvalidTimeout)?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(CommandError::InvalidTimeout);
        }

        let milliseconds = (seconds * 1000.0) as u64;

        if milliseconds == 0 {
            return Ok(None);
        }

        Ok(Some(Duration::from_millis(milliseconds)))
    } else {
        let seconds = text
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidTimeout)?;

        if seconds < 0 {
            return Err(CommandError::InvalidTimeout);
        }

        if seconds == 0 {
            return Ok(None);
        }

        Ok(Some(Duration::from_secs(seconds as u64)))
    }
}

enum HandOffOutcome {
    Delivered(Bytes),
    ChannelClosed,
    TimedOut,
}

/// Handles the BLPOP command.
///
/// Pops the head of the list immediately when one is available; otherwise
/// the client parks in the key's waiter FIFO until a push hands it a value
/// or the timeout fires. The emptiness check and the park share one
/// critical section, so a concurrent push cannot slip between them and be
/// missed.
pub async fn blpop(
    store: &Arc<Mutex<KeyValueStore>>,
    state: &Arc<Mutex<State>>,
    arguments: Vec<Bytes>,
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    let (waiter_id, mut receiver) = {
        let mut store_guard = store.lock().await;

        if let Some(value) = store_guard.pop_front(&blpop_arguments.key)? {
            return Ok(key_value_reply(blpop_arguments.key, value));
        }

        // Lock order: store, then state.
        let mut state_guard = state.lock().await;
        state_guard.enqueue_waiter(blpop_arguments.key.clone())
    };

    match wait_for_hand_off(&mut receiver, blpop_arguments.timeout).await {
        HandOffOutcome::Delivered(value) => Ok(key_value_reply(blpop_arguments.key, value)),
        HandOffOutcome::ChannelClosed => Ok(RespValue::NullArray),
        HandOffOutcome::TimedOut => {
            let _store_guard = store.lock().await;
            let mut state_guard = state.lock().await;
            state_guard.remove_waiter(&blpop_arguments.key, waiter_id);
            drop(state_guard);

            // A push may have delivered into the channel in the instant
            // before the waiter was removed; that value must win over the
            // timeout or it would be lost.
            match receiver.try_recv() {
                Ok(value) => Ok(key_value_reply(blpop_arguments.key, value)),
                Err(_) => Ok(RespValue::NullArray),
            }
        }
    }
}

/// Waits on the wake-up channel, bounded by the parsed timeout.
async fn wait_for_hand_off(
    receiver: &mut oneshot::Receiver<Bytes>,
    timeout: Option<Duration>,
) -> HandOffOutcome {
    match timeout {
        None => match receiver.await {
            Ok(value) => HandOffOutcome::Delivered(value),
            Err(_) => HandOffOutcome::ChannelClosed,
        },
        Some(duration) => match tokio::time::timeout(duration, &mut *receiver).await {
            Ok(Ok(value)) => HandOffOutcome::Delivered(value),
            Ok(Err(_)) => HandOffOutcome::ChannelClosed,
            Err(_) => HandOffOutcome::TimedOut,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        let test_cases: Vec<(&[u8], Result<Option<Duration>, CommandError>)> = vec![
            (b"0", Ok(None)),
            (b"5", Ok(Some(Duration::from_secs(5)))),
            (b"0.5", Ok(Some(Duration::from_millis(500)))),
            (b"1.25", Ok(Some(Duration::from_millis(1250)))),
            // Fractional milliseconds truncate.
            (b"0.0015", Ok(Some(Duration::from_millis(1)))),
            // A decimal that truncates to zero behaves like 0.
            (b"0.0", Ok(None)),
            (b"-1", Err(CommandError::InvalidTimeout)),
            (b"-0.5", Err(CommandError::InvalidTimeout)),
            (b"abc", Err(CommandError::InvalidTimeout)),
            (b"1s", Err(CommandError::InvalidTimeout)),
            (b"", Err(CommandError::InvalidTimeout)),
            (b"nan", Err(CommandError::InvalidTimeout)),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                parse_timeout(input),
                expected,
                "parsing timeout {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_parse_arguments() {
        let parsed =
            BlpopArguments::parse(vec![Bytes::from("queue"), Bytes::from("2")]).unwrap();
        assert_eq!(parsed.key, Bytes::from("queue"));
        assert_eq!(parsed.timeout, Some(Duration::from_secs(2)));

        let missing_timeout = BlpopArguments::parse(vec![Bytes::from("queue")]);
        assert_eq!(
            missing_timeout.err(),
            Some(CommandError::WrongArity("BLPOP"))
        );
    }

    #[tokio::test]
    async fn test_wait_for_hand_off_delivery() {
        let (sender, mut receiver) = oneshot::channel();
        sender.send(Bytes::from("value")).unwrap();

        match wait_for_hand_off(&mut receiver, Some(Duration::from_secs(5))).await {
            HandOffOutcome::Delivered(value) => assert_eq!(value, Bytes::from("value")),
            _ => panic!("expected delivery"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_hand_off_timeout() {
        let (_sender, mut receiver) = oneshot::channel::<Bytes>();

        match wait_for_hand_off(&mut receiver, Some(Duration::from_millis(10))).await {
            HandOffOutcome::TimedOut => (),
            _ => panic!("expected timeout"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_hand_off_closed_channel() {
        let (sender, mut receiver) = oneshot::channel::<Bytes>();
        drop(sender);

        match wait_for_hand_off(&mut receiver, None).await {
            HandOffOutcome::ChannelClosed => (),
            _ => panic!("expected closed channel"),
        }
    }
}
