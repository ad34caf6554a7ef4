#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use redlite::{
    commands::{CommandError, CommandHandler},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Test environment containing the shared store and coordinator state.
pub struct TestEnv {
    pub store: Arc<Mutex<KeyValueStore>>,
    pub state: Arc<Mutex<State>>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(KeyValueStore::new())),
            state: Arc::new(Mutex::new(State::new())),
        }
    }

    /// Clones the handles so concurrent tasks share the same environment.
    pub fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }

    /// Runs a command given as its bulk-string parts.
    pub async fn exec(&self, parts: &[&str]) -> Result<RespValue, CommandError> {
        let handler = CommandHandler::new(command(parts)).expect("valid request frame");
        handler.handle_command(&self.store, &self.state).await
    }

    /// Runs a command and asserts the reply.
    pub async fn exec_ok(&self, parts: &[&str], expected: RespValue) {
        let result = self.exec(parts).await;
        assert_eq!(result, Ok(expected), "running {:?}", parts);
    }

    /// Runs a command and asserts it fails.
    pub async fn exec_err(&self, parts: &[&str], expected: CommandError) {
        let result = self.exec(parts).await;
        assert_eq!(result, Err(expected), "running {:?}", parts);
    }

    /// Spawns a BLPOP task that blocks on the given key.
    pub fn spawn_blpop(
        &self,
        key: &str,
        timeout: &str,
    ) -> JoinHandle<Result<RespValue, CommandError>> {
        let env = self.clone();
        let key = key.to_string();
        let timeout = timeout.to_string();

        tokio::spawn(async move { env.exec(&["BLPOP", &key, &timeout]).await })
    }
}

/// Builds a request frame from its bulk-string parts.
pub fn command(parts: &[&str]) -> RespValue {
    RespValue::Array(
        parts
            .iter()
            .map(|part| RespValue::BulkString(Bytes::from(part.to_string())))
            .collect(),
    )
}

pub fn bulk(value: &str) -> RespValue {
    RespValue::BulkString(Bytes::from(value.to_string()))
}

pub fn simple(value: &str) -> RespValue {
    RespValue::SimpleString(value.to_string())
}

pub fn array_of(values: &[&str]) -> RespValue {
    RespValue::Array(values.iter().map(|value| bulk(value)).collect())
}

/// Waits for a spawned command task, failing the test if it hangs.
pub async fn wait_for_completion(
    task: JoinHandle<Result<RespValue, CommandError>>,
    timeout_duration: Duration,
) -> Result<RespValue, CommandError> {
    timeout(timeout_duration, task)
        .await
        .expect("task should complete within timeout")
        .expect("task should not panic")
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
