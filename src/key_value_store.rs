use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;

use crate::stream::{Stream, StreamId, StreamIdError, StreamIdSpec};

#[derive(Error, Debug, PartialEq)]
pub enum KeyspaceError {
    #[error("Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error(transparent)]
    StreamId(#[from] StreamIdError),
}

/// The payload stored at a key. A key holds exactly one kind of value.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(Bytes),
    List(VecDeque<Bytes>),
    Stream(Stream),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: DataType,
    /// Strings written with `SET ... PX <ms>` carry an expiration instant;
    /// lists and streams never expire.
    pub expiration: Option<Instant>,
}

/// The shared keyspace. Expiry is lazy: an expired entry is removed by the
/// first read that observes it, and is indistinguishable from a missing key.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<Bytes, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        KeyValueStore {
            entries: HashMap::new(),
        }
    }

    /// Removes the entry at `key` if its expiration has passed. Every
    /// accessor goes through this first.
    fn expire_if_needed(&mut self, key: &[u8]) {
        if let Some(value) = self.entries.get(key) {
            if let Some(expiration) = value.expiration {
                if Instant::now() >= expiration {
                    self.entries.remove(key);
                }
            }
        }
    }

    pub fn get_string(&mut self, key: &[u8]) -> Result<Option<Bytes>, KeyspaceError> {
        self.expire_if_needed(key);

        match self.entries.get(key) {
            Some(value) => match value.data {
                DataType::String(ref content) => Ok(Some(content.clone())),
                _ => Err(KeyspaceError::WrongType),
            },
            None => Ok(None),
        }
    }

    /// Overwrites any prior value of any type at `key`. A TTL of zero
    /// milliseconds is already expired on the first read.
    pub fn set_string(&mut self, key: Bytes, value: Bytes, ttl: Option<Duration>) {
        let expiration = ttl.map(|ttl| Instant::now() + ttl);

        self.entries.insert(
            key,
            Value {
                data: DataType::String(value),
                expiration,
            },
        );
    }

    pub fn type_of(&mut self, key: &[u8]) -> &'static str {
        self.expire_if_needed(key);

        match self.entries.get(key).map(|value| &value.data) {
            Some(DataType::String(_)) => "string",
            Some(DataType::List(_)) => "list",
            Some(DataType::Stream(_)) => "stream",
            None => "none",
        }
    }

    /// Pushes `values` onto the list at `key`, creating it if absent.
    ///
    /// With `front` set, values are inserted one-by-one at the head in
    /// left-to-right order, so the last argument ends up at position 0.
    /// Returns the length of the list after the push.
    pub fn push(
        &mut self,
        key: Bytes,
        values: Vec<Bytes>,
        front: bool,
    ) -> Result<usize, KeyspaceError> {
        self.expire_if_needed(&key);

        let entry = self.entries.entry(key).or_insert_with(|| Value {
            data: DataType::List(VecDeque::new()),
            expiration: None,
        });

        let DataType::List(ref mut list) = entry.data else {
            return Err(KeyspaceError::WrongType);
        };

        for value in values {
            if front {
                list.push_front(value);
            } else {
                list.push_back(value);
            }
        }

        Ok(list.len())
    }

    /// Removes and returns the head of the list at `key`. A list drained to
    /// zero elements is removed from the keyspace.
    pub fn pop_front(&mut self, key: &[u8]) -> Result<Option<Bytes>, KeyspaceError> {
        self.expire_if_needed(key);

        let Some(value) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        let DataType::List(ref mut list) = value.data else {
            return Err(KeyspaceError::WrongType);
        };

        let popped = list.pop_front();

        if list.is_empty() {
            self.entries.remove(key);
        }

        Ok(popped)
    }

    pub fn llen(&mut self, key: &[u8]) -> Result<usize, KeyspaceError> {
        self.expire_if_needed(key);

        match self.entries.get(key) {
            Some(value) => match value.data {
                DataType::List(ref list) => Ok(list.len()),
                _ => Err(KeyspaceError::WrongType),
            },
            None => Ok(0),
        }
    }

    /// Returns the inclusive slice `[start, stop]` of the list at `key`.
    /// Negative indices count from the end; out-of-range windows clamp.
    pub fn lrange(
        &mut self,
        key: &[u8],
        start: i64,
        stop: i64,
    ) -> Result<Vec<Bytes>, KeyspaceError> {
        self.expire_if_needed(key);

        let Some(value) = self.entries.get(key) else {
            return Ok(Vec::new());
        };

        let DataType::List(ref list) = value.data else {
            return Err(KeyspaceError::WrongType);
        };

        let Some((start, stop)) = normalize_range(list.len(), start, stop) else {
            return Ok(Vec::new());
        };

        Ok(list.range(start..=stop).cloned().collect())
    }

    /// Borrows the list at `key`, if one exists. Used by the push hand-off
    /// path, which pops delivered values in the same critical section.
    pub fn list_mut(&mut self, key: &[u8]) -> Option<&mut VecDeque<Bytes>> {
        match self.entries.get_mut(key) {
            Some(Value {
                data: DataType::List(list),
                ..
            }) => Some(list),
            _ => None,
        }
    }

    /// Removes the entry at `key` if it is a list that has been drained.
    pub fn remove_if_drained(&mut self, key: &[u8]) {
        if let Some(Value {
            data: DataType::List(list),
            ..
        }) = self.entries.get(key)
        {
            if list.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// Appends an entry to the stream at `key`, creating the stream on the
    /// first successful append. A failed id validation leaves the keyspace
    /// untouched.
    pub fn xadd(
        &mut self,
        key: Bytes,
        spec: StreamIdSpec,
        fields: Vec<(Bytes, Bytes)>,
    ) -> Result<StreamId, KeyspaceError> {
        self.expire_if_needed(&key);

        match self.entries.get_mut(&key[..]) {
            Some(value) => match value.data {
                DataType::Stream(ref mut stream) => Ok(stream.append(spec, fields)?),
                _ => Err(KeyspaceError::WrongType),
            },
            None => {
                let mut stream = Stream::new();
                let id = stream.append(spec, fields)?;

                self.entries.insert(
                    key,
                    Value {
                        data: DataType::Stream(stream),
                        expiration: None,
                    },
                );

                Ok(id)
            }
        }
    }

    /// Removes every key.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps possibly-negative LRANGE indices onto a concrete inclusive window,
/// or `None` when the normalized window is empty. A negative index counts
/// from the end of the list; the window clamps to the list bounds.
fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }

    let len = len as i64;
    let resolve = |index: i64| if index < 0 { len + index } else { index };

    let start = resolve(start).max(0);
    let stop = resolve(stop).min(len - 1);

    if start >= len || start > stop {
        return None;
    }

    Some((start as usize, stop as usize))
}
