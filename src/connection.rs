// ABOUTME: Buffered frame reader for the SMPP transport
// ABOUTME: Yields one complete length-prefixed frame per call, keeping residual bytes buffered

use crate::codec::{CodecError, MAX_PDU_SIZE};
use crate::error::{SmppError, SmppResult};
use bytes::{Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads length-prefixed SMPP frames off a byte stream.
///
/// A PDU on the wire is a big-endian `command_length` followed by
/// `command_length - 4` more bytes. Bytes belonging to the next frame stay in
/// the internal buffer across calls, so back-to-back PDUs split at exact frame
/// boundaries no matter how the transport chunks them.
#[derive(Debug)]
pub struct FrameReader<R> {
    io: R,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(io: R) -> FrameReader<R> {
        FrameReader {
            io,
            // 4KB covers every PDU this crate produces; BytesMut grows on
            // demand for oversized-but-legal frames.
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read one complete frame, length prefix included.
    ///
    /// Returns `Ok(None)` on a clean end of stream (EOF between frames). EOF
    /// in the middle of a frame is a connection error.
    pub async fn read_frame(&mut self) -> SmppResult<Option<Bytes>> {
        loop {
            if let Some(frame) = self.extract_frame()? {
                return Ok(Some(frame));
            }

            if 0 == self.io.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(SmppError::Connection(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "peer closed the connection mid-frame",
                    )))
                };
            }
        }
    }

    /// Split one frame off the front of the buffer if it holds a complete one.
    fn extract_frame(&mut self) -> Result<Option<Bytes>, CodecError> {
        if self.buffer.len() < 4 {
            return Ok(None);
        }

        let declared =
            u32::from_be_bytes([self.buffer[0], self.buffer[1], self.buffer[2], self.buffer[3]]);
        if declared <= 4 {
            return Err(CodecError::MalformedFrame(declared));
        }
        if declared > MAX_PDU_SIZE {
            return Err(CodecError::OversizedFrame(declared));
        }
        if self.buffer.len() < declared as usize {
            return Ok(None);
        }

        Ok(Some(self.buffer.split_to(declared as usize).freeze()))
    }
}
