//! In-process IO transport: length-prefixed byte framing used by the base
//! OT, the IKNP extension and the streaming garbler/evaluator, plus an
//! in-memory duplex pipe pair for tests and single-process sessions.
//!
//! The framing contract is deliberately thin: `send_data` writes a 4-byte
//! big-endian length prefix followed by the payload, `send_u32`/`send_byte`
//! write their value directly, and raw (unframed) label rows are written
//! with [`Channel::write_bytes`] since their length is implied by the gate
//! they belong to. Writes may be buffered; [`Channel::flush`] must be called
//! before a reply is expected.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};

use crate::label::Label;
use crate::{MpcError, Result};

/// The IO contract shared by every protocol layer in this crate.
pub trait Channel {
    /// Writes `buf` verbatim, unframed.
    fn write_bytes(&mut self, buf: &[u8]) -> Result<()>;

    /// Reads exactly `buf.len()` bytes, blocking until available or the
    /// stream closes.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Flushes any buffered writes. Required before a reply can be expected.
    fn flush(&mut self) -> Result<()>;

    fn send_byte(&mut self, b: u8) -> Result<()> {
        self.write_bytes(&[b])
    }

    fn send_u32(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<()> {
        self.send_u32(data.len() as u32)?;
        self.write_bytes(data)
    }

    fn send_label(&mut self, label: Label) -> Result<()> {
        self.write_bytes(label.as_bytes())
    }

    fn recv_byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_bytes(&mut b)?;
        Ok(b[0])
    }

    fn recv_u32(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        self.read_bytes(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    fn recv_data(&mut self) -> Result<Vec<u8>> {
        let len = self.recv_u32()? as usize;
        let mut buf = vec![0u8; len];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    fn recv_label(&mut self) -> Result<Label> {
        let mut buf = [0u8; 16];
        self.read_bytes(&mut buf)?;
        Ok(Label::from_bytes(buf))
    }
}

/// A [`Channel`] over any `Read + Write` stream, with buffered writes.
pub struct StreamChannel<S> {
    stream: S,
    write_buf: Vec<u8>,
}

impl<S: Read + Write> StreamChannel<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            write_buf: Vec::new(),
        }
    }
}

impl<S: Read + Write> Channel for StreamChannel<S> {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.write_buf.extend_from_slice(buf);
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream
            .read_exact(buf)
            .map_err(|e| MpcError::Io(e.to_string()))
    }

    fn flush(&mut self) -> Result<()> {
        self.stream
            .write_all(&self.write_buf)
            .map_err(|e| MpcError::Io(e.to_string()))?;
        self.write_buf.clear();
        self.stream
            .flush()
            .map_err(|e| MpcError::Io(e.to_string()))
    }
}

/// One end of an in-memory, bidirectional byte pipe. Closing one end (by
/// dropping it) surfaces end-of-stream as an `IO` error on the other.
pub struct PipeEnd {
    /// Bytes this end has written, waiting to be read by the peer.
    outbox: Arc<PipeBuf>,
    /// Bytes the peer has written, waiting to be read by this end.
    inbox: Arc<PipeBuf>,
}

struct PipeBuf {
    queue: Mutex<VecDeque<u8>>,
    closed: Mutex<bool>,
    cond: Condvar,
}

impl PipeBuf {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            closed: Mutex::new(false),
            cond: Condvar::new(),
        }
    }
}

impl Drop for PipeEnd {
    fn drop(&mut self) {
        *self.outbox.closed.lock().unwrap() = true;
        self.outbox.cond.notify_all();
    }
}

/// Builds a connected pair of in-memory pipe ends, suitable for wrapping in
/// [`StreamChannel`] on each side of a test.
pub fn pipe_pair() -> (PipeEnd, PipeEnd) {
    let a_to_b = Arc::new(PipeBuf::new());
    let b_to_a = Arc::new(PipeBuf::new());
    let a = PipeEnd {
        outbox: a_to_b.clone(),
        inbox: b_to_a.clone(),
    };
    let b = PipeEnd {
        outbox: b_to_a,
        inbox: a_to_b,
    };
    (a, b)
}

impl Write for PipeEnd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut q = self.outbox.queue.lock().unwrap();
        q.extend(buf.iter().copied());
        self.outbox.cond.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for PipeEnd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut q = self.inbox.queue.lock().unwrap();
        loop {
            if !q.is_empty() {
                let n = buf.len().min(q.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = q.pop_front().unwrap();
                }
                return Ok(n);
            }
            if *self.inbox.closed.lock().unwrap() {
                return Ok(0);
            }
            q = self.inbox.cond.wait(q).unwrap();
        }
    }
}

/// Convenience alias for a [`StreamChannel`] wrapping a [`PipeEnd`].
pub type PipeChannel = StreamChannel<PipeEnd>;

pub fn channel_pair() -> (PipeChannel, PipeChannel) {
    let (a, b) = pipe_pair();
    (StreamChannel::new(a), StreamChannel::new(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn framed_roundtrip() {
        let (mut a, mut b) = channel_pair();
        a.send_byte(7).unwrap();
        a.send_u32(0x01020304).unwrap();
        a.send_data(b"hello").unwrap();
        a.send_label(Label::from_halves(1, 2)).unwrap();
        a.flush().unwrap();

        assert_eq!(b.recv_byte().unwrap(), 7);
        assert_eq!(b.recv_u32().unwrap(), 0x01020304);
        assert_eq!(b.recv_data().unwrap(), b"hello");
        assert_eq!(b.recv_label().unwrap(), Label::from_halves(1, 2));
    }

    #[test]
    fn concurrent_threads_roundtrip() {
        let (mut a, mut b) = channel_pair();
        let handle = thread::spawn(move || {
            for i in 0..100u32 {
                a.send_u32(i).unwrap();
            }
            a.flush().unwrap();
        });
        for i in 0..100u32 {
            assert_eq!(b.recv_u32().unwrap(), i);
        }
        handle.join().unwrap();
    }

    #[test]
    fn closed_pipe_is_eof() {
        let (a, mut b) = channel_pair();
        drop(a);
        let mut buf = [0u8; 4];
        let err = b.read_bytes(&mut buf).unwrap_err();
        assert!(matches!(err, MpcError::Io(_)));
    }
}
