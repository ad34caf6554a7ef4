use std::fmt;

use bytes::Bytes;
use thiserror::Error;

/// Errors produced while validating an XADD entry id. The display texts are
/// part of the wire contract and must not be reworded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamIdError {
    #[error(
        "The ID specified in XADD must be in the format timestamp-sequence_number or timestamp-*"
    )]
    InvalidFormat,
    #[error("The ID specified in XADD must be greater than 0-0")]
    ZeroId,
    #[error("The ID specified in XADD is equal or smaller than the target stream top item")]
    SmallerThanTop,
}

/// A stream entry id: a `(milliseconds, sequence)` pair ordered
/// lexicographically and rendered as `<ms>-<seq>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub fn new(ms: u64, seq: u64) -> Self {
        StreamId { ms, seq }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

/// A requested XADD id before resolution: either fully explicit or with an
/// auto-assigned sequence part (`<ms>-*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamIdSpec {
    Explicit(StreamId),
    AutoSeq { ms: u64 },
}

impl StreamIdSpec {
    /// Parses `<ms>-<seq>` or `<ms>-*`. Any other shape, including a bare
    /// `*`, is rejected.
    pub fn parse(requested: &[u8]) -> Result<Self, StreamIdError> {
        let text = str::from_utf8(requested).map_err(|_| StreamIdError::InvalidFormat)?;

        let (ms_part, seq_part) = text.split_once('-').ok_or(StreamIdError::InvalidFormat)?;

        let ms = parse_id_part(ms_part)?;

        if seq_part == "*" {
            return Ok(StreamIdSpec::AutoSeq { ms });
        }

        let seq = parse_id_part(seq_part)?;

        Ok(StreamIdSpec::Explicit(StreamId::new(ms, seq)))
    }
}

fn parse_id_part(part: &str) -> Result<u64, StreamIdError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamIdError::InvalidFormat);
    }

    part.parse::<u64>().map_err(|_| StreamIdError::InvalidFormat)
}

/// Resolves a requested id against the last id of the target stream.
///
/// Validation order: the literal `0-0` is rejected first; an `<ms>-*`
/// request then gets its sequence assigned; finally the resolved id must be
/// strictly greater than the stream's current top id.
pub fn resolve_stream_id(
    spec: StreamIdSpec,
    last_id: Option<StreamId>,
) -> Result<StreamId, StreamIdError> {
    match spec {
        StreamIdSpec::Explicit(id) => {
            if id.ms == 0 && id.seq == 0 {
                return Err(StreamIdError::ZeroId);
            }

            if let Some(last) = last_id {
                if id <= last {
                    return Err(StreamIdError::SmallerThanTop);
                }
            }

            Ok(id)
        }
        StreamIdSpec::AutoSeq { ms } => match last_id {
            None => {
                if ms == 0 {
                    Ok(StreamId::new(0, 1))
                } else {
                    Ok(StreamId::new(ms, 0))
                }
            }
            Some(last) => {
                if ms > last.ms {
                    Ok(StreamId::new(ms, 0))
                } else if ms == last.ms {
                    Ok(StreamId::new(ms, last.seq + 1))
                } else {
                    Err(StreamIdError::SmallerThanTop)
                }
            }
        },
    }
}

/// A single stream entry. Field pairs keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: Vec<(Bytes, Bytes)>,
}

/// An append-only log of entries in strictly increasing id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn new() -> Self {
        Stream {
            entries: Vec::new(),
        }
    }

    pub fn last_id(&self) -> Option<StreamId> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Resolves the requested id against this stream and appends the entry.
    pub fn append(
        &mut self,
        spec: StreamIdSpec,
        fields: Vec<(Bytes, Bytes)>,
    ) -> Result<StreamId, StreamIdError> {
        let id = resolve_stream_id(spec, self.last_id())?;
        self.entries.push(StreamEntry { id, fields });

        Ok(id)
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }
}
