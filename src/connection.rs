use std::io::Cursor;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::commands::CommandHandler;
use crate::resp::{RespError, RespValue};

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed mid-frame")]
    ClosedMidFrame,
    #[error("protocol error: {0}")]
    Protocol(#[from] RespError),
}

/// A client connection: the socket plus a read buffer.
///
/// Bytes are read from the socket into the buffer; once a complete frame
/// has accumulated it is parsed and removed. Frame boundaries need not
/// align with reads, and several pipelined requests in one read are
/// drained one at a time.
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Reads the next request, buffering until a full frame is available.
    ///
    /// Returns `Ok(None)` on a clean end of stream. A protocol violation
    /// (bad framing or a request that is not an array of bulk strings) is
    /// an error; the caller drops the connection without replying.
    pub async fn read_request(&mut self) -> Result<Option<CommandHandler>, ConnectionError> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(CommandHandler::new(frame)?));
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }

                return Err(ConnectionError::ClosedMidFrame);
            }
        }
    }

    /// Attempts to parse one frame out of the buffer, consuming its bytes
    /// on success. `Ok(None)` means more data is needed.
    fn parse_frame(&mut self) -> Result<Option<RespValue>, RespError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&self.buffer[..]);

        match RespValue::parse(&mut cursor) {
            Ok(frame) => {
                let consumed = cursor.position() as usize;
                self.buffer.advance(consumed);

                Ok(Some(frame))
            }
            Err(RespError::Incomplete) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Reads more bytes into the buffer without parsing them. Returns the
    /// number of bytes read; 0 means the peer closed the connection.
    ///
    /// Used while a command is in flight: pipelined requests accumulate in
    /// the buffer for later, and an end-of-stream tells the caller to
    /// cancel the command (dropping a parked waiter's receiver, so a
    /// pushed value re-targets a live client instead).
    pub async fn fill_buffer(&mut self) -> std::io::Result<usize> {
        self.stream.read_buf(&mut self.buffer).await
    }

    pub async fn write_reply(&mut self, reply: &RespValue) -> Result<(), ConnectionError> {
        self.stream.write_all(&reply.encode()).await?;
        self.stream.flush().await?;

        Ok(())
    }
}
