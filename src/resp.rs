use std::io::Cursor;

use bytes::{Buf, Bytes};
use thiserror::Error;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    /// Not enough buffered bytes to parse a complete frame. The caller is
    /// expected to read more from the socket and retry.
    #[error("not enough data to parse a complete frame")]
    Incomplete,
    #[error("invalid frame type byte: {0}")]
    InvalidTypeByte(u8),
    #[error("invalid frame length")]
    InvalidLength,
    #[error("frame is missing a CRLF terminator")]
    MissingTerminator,
    #[error("request is not an array of bulk strings")]
    MalformedRequest,
}

/// A RESP2 value, used both for decoded requests and for replies.
#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    NullBulkString,
    Array(Vec<RespValue>),
    NullArray,
}

impl RespValue {
    /// Parses a single frame from the cursor, advancing it past the frame.
    ///
    /// Requests are arrays of bulk strings, so only `*` and `$` frames are
    /// accepted; any other leading byte is a protocol error. Bulk string
    /// lengths are authoritative: bodies may contain CRLF and are read by
    /// count, with the terminator checked afterwards.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, RespError> {
        if !src.has_remaining() {
            return Err(RespError::Incomplete);
        }

        match src.get_u8() {
            b'*' => {
                let length = parse_decimal(read_line(src)?)?;

                if length == -1 {
                    return Ok(RespValue::NullArray);
                }

                if length < 0 {
                    return Err(RespError::InvalidLength);
                }

                let mut elements = Vec::with_capacity(length as usize);

                for _ in 0..length {
                    elements.push(Self::parse(src)?);
                }

                Ok(RespValue::Array(elements))
            }
            b'$' => {
                let length = parse_decimal(read_line(src)?)?;

                if length == -1 {
                    return Ok(RespValue::NullBulkString);
                }

                if length < 0 {
                    return Err(RespError::InvalidLength);
                }

                let length = length as usize;
                let start = src.position() as usize;
                let buffered = src.get_ref().len();

                if buffered < start + length + CRLF.len() {
                    return Err(RespError::Incomplete);
                }

                let content = Bytes::copy_from_slice(&src.get_ref()[start..start + length]);

                if &src.get_ref()[start + length..start + length + CRLF.len()] != CRLF {
                    return Err(RespError::MissingTerminator);
                }
                src.set_position((start + length + CRLF.len()) as u64);

                Ok(RespValue::BulkString(content))
            }
            other => Err(RespError::InvalidTypeByte(other)),
        }
    }

    /// Serializes the value into its RESP wire representation.
    pub fn encode(&self) -> Bytes {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer);
        Bytes::from(buffer)
    }

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(content) => {
                buffer.push(b'+');
                buffer.extend_from_slice(content.as_bytes());
                buffer.extend_from_slice(CRLF);
            }
            RespValue::Error(message) => {
                buffer.push(b'-');
                buffer.extend_from_slice(message.as_bytes());
                buffer.extend_from_slice(CRLF);
            }
            RespValue::Integer(value) => {
                buffer.push(b':');
                buffer.extend_from_slice(value.to_string().as_bytes());
                buffer.extend_from_slice(CRLF);
            }
            RespValue::BulkString(content) => {
                buffer.push(b'$');
                buffer.extend_from_slice(content.len().to_string().as_bytes());
                buffer.extend_from_slice(CRLF);
                buffer.extend_from_slice(content);
                buffer.extend_from_slice(CRLF);
            }
            RespValue::NullBulkString => {
                buffer.extend_from_slice(b"$-1\r\n");
            }
            RespValue::Array(elements) => {
                buffer.push(b'*');
                buffer.extend_from_slice(elements.len().to_string().as_bytes());
                buffer.extend_from_slice(CRLF);

                for element in elements {
                    element.encode_into(buffer);
                }
            }
            RespValue::NullArray => {
                buffer.extend_from_slice(b"*-1\r\n");
            }
        }
    }

    /// Builds an array reply whose elements are bulk strings.
    pub fn array_of_bulks<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        RespValue::Array(items.into_iter().map(RespValue::BulkString).collect())
    }
}

/// Reads up to the next CRLF and returns the line without its terminator.
fn read_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], RespError> {
    let start = src.position() as usize;

    let terminator = src.get_ref()[start..]
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(RespError::Incomplete)?;

    src.set_position((terminator + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..terminator])
}

/// Parses a length line. The grammar only allows decimal digits with an
/// optional leading minus for the `-1` null sentinel.
fn parse_decimal(line: &[u8]) -> Result<i64, RespError> {
    let text = str::from_utf8(line).map_err(|_| RespError::InvalidLength)?;

    if text.is_empty() {
        return Err(RespError::InvalidLength);
    }

    text.parse::<i64>().map_err(|_| RespError::InvalidLength)
}
