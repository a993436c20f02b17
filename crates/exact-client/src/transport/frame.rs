//! Newline-delimited frame reassembly.
//!
//! The reader keeps its buffer between calls: bytes after a newline belong to
//! the next frame, and a read that times out leaves a partial frame in place
//! for the next attempt. An oversized frame is reported once and then skipped
//! up to its newline, so the frames behind it still arrive.

use std::io::{self, Read};

use crate::errors::ClientError;

const CHUNK_BYTES: usize = 1024;

/// Reassembles frames from a byte stream.
#[derive(Debug)]
pub struct FrameReader {
    buffer: Vec<u8>,
    max_frame_bytes: usize,
    /// Set while the remainder of a rejected frame is being dropped.
    discarding: bool,
}

impl FrameReader {
    /// Creates a reader rejecting frames longer than `max_frame_bytes`,
    /// excluding the newline.
    #[must_use]
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_bytes,
            discarding: false,
        }
    }

    /// Reads until one complete frame is buffered and returns it without
    /// its newline.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ConnectionClosed`] on end of stream.
    /// - [`ClientError::FrameTooLarge`] when a frame exceeds the limit; the
    ///   rest of that frame is skipped and later frames are kept.
    /// - [`ClientError::Receive`] for other read failures, including
    ///   timeouts, which keep the buffer intact.
    pub fn read_frame<R: Read>(&mut self, stream: &mut R) -> Result<Vec<u8>, ClientError> {
        let mut chunk = [0_u8; CHUNK_BYTES];
        loop {
            if let Some(frame) = self.take_frame()? {
                return Ok(frame);
            }

            let bytes_read = read_chunk_with_retry(stream, &mut chunk)?;
            if bytes_read == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    }

    /// Drops buffered bytes, used when the connection is replaced.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Bytes received that do not yet form a complete frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn take_frame(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        loop {
            let newline = self.buffer.iter().position(|byte| *byte == b'\n');
            if self.discarding {
                let Some(newline) = newline else {
                    self.buffer.clear();
                    return Ok(None);
                };
                self.buffer.drain(..=newline);
                self.discarding = false;
                continue;
            }

            return match newline {
                Some(size) if size > self.max_frame_bytes => {
                    self.buffer.drain(..=size);
                    Err(self.too_large(size))
                }
                Some(newline) => {
                    let mut frame: Vec<u8> = self.buffer.drain(..=newline).collect();
                    frame.pop();
                    Ok(Some(frame))
                }
                None if self.buffer.len() > self.max_frame_bytes => {
                    let size = self.buffer.len();
                    self.buffer.clear();
                    self.discarding = true;
                    Err(self.too_large(size))
                }
                None => Ok(None),
            };
        }
    }

    fn too_large(&self, size: usize) -> ClientError {
        ClientError::FrameTooLarge {
            size,
            max_size: self.max_frame_bytes,
        }
    }
}

fn read_chunk_with_retry<R: Read>(stream: &mut R, chunk: &mut [u8]) -> Result<usize, ClientError> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ClientError::ConnectionClosed);
            }
            Err(error) => return Err(ClientError::Receive(error)),
        }
    }
}
