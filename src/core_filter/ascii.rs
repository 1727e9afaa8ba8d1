use super::DataFilter;
use crate::core_fs::{FsReader, FsWriter};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// TYPE A line-ending translation: bare LF becomes CRLF on the way to the
/// client, CRLF becomes LF on the way to disk. Changes the byte count, so
/// REST/APPE/SIZE are off the table while it is active.
pub struct AsciiFilter;

impl DataFilter for AsciiFilter {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn modifies_data_length(&self) -> bool {
        true
    }

    fn wrap_read(&self, inner: FsReader) -> FsReader {
        Box::new(AsciiEncodeReader::new(inner))
    }

    fn wrap_write(&self, inner: FsWriter) -> FsWriter {
        Box::new(AsciiDecodeWriter::new(inner))
    }
}

/// Inserts a CR before every LF that does not already follow one.
pub struct AsciiEncodeReader {
    inner: FsReader,
    pending: Vec<u8>,
    pos: usize,
    prev: u8,
}

impl AsciiEncodeReader {
    pub fn new(inner: FsReader) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            pos: 0,
            prev: 0,
        }
    }
}

impl AsyncRead for AsciiEncodeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        loop {
            if me.pos < me.pending.len() {
                let n = buf.remaining().min(me.pending.len() - me.pos);
                buf.put_slice(&me.pending[me.pos..me.pos + n]);
                me.pos += n;
                if me.pos >= me.pending.len() {
                    me.pending.clear();
                    me.pos = 0;
                }
                return Poll::Ready(Ok(()));
            }

            let mut tmp = [0u8; 4096];
            let mut tmp_buf = ReadBuf::new(&mut tmp);
            match Pin::new(&mut me.inner).poll_read(cx, &mut tmp_buf) {
                Poll::Ready(Ok(())) => {
                    let filled = tmp_buf.filled();
                    if filled.is_empty() {
                        return Poll::Ready(Ok(()));
                    }
                    for &b in filled {
                        if b == b'\n' && me.prev != b'\r' {
                            me.pending.push(b'\r');
                        }
                        me.pending.push(b);
                        me.prev = b;
                    }
                }
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Collapses CRLF to LF. A CR at a chunk boundary is held back until the
/// next byte decides its fate; shutdown flushes a dangling CR as-is.
pub struct AsciiDecodeWriter {
    inner: FsWriter,
    out: Vec<u8>,
    out_pos: usize,
    cr_pending: bool,
}

impl AsciiDecodeWriter {
    pub fn new(inner: FsWriter) -> Self {
        Self {
            inner,
            out: Vec::new(),
            out_pos: 0,
            cr_pending: false,
        }
    }

    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.out_pos < self.out.len() {
            match Pin::new(&mut self.inner).poll_write(cx, &self.out[self.out_pos..]) {
                Poll::Ready(Ok(0)) => {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    )))
                }
                Poll::Ready(Ok(n)) => self.out_pos += n,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => return Poll::Pending,
            }
        }
        self.out.clear();
        self.out_pos = 0;
        Poll::Ready(Ok(()))
    }

    fn transform(&mut self, buf: &[u8]) {
        for &b in buf {
            if self.cr_pending {
                self.cr_pending = false;
                match b {
                    b'\n' => self.out.push(b'\n'),
                    b'\r' => {
                        self.out.push(b'\r');
                        self.cr_pending = true;
                    }
                    other => {
                        self.out.push(b'\r');
                        self.out.push(other);
                    }
                }
            } else if b == b'\r' {
                self.cr_pending = true;
            } else {
                self.out.push(b);
            }
        }
    }
}

impl AsyncWrite for AsciiDecodeWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let me = self.get_mut();
        // Leftovers from the previous call must land before new input.
        match me.poll_drain(cx) {
            Poll::Ready(Ok(())) => {}
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Pending => return Poll::Pending,
        }
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }
        me.transform(buf);
        // Best effort; anything left is drained on the next call.
        match me.poll_drain(cx) {
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Ready(Ok(())) | Poll::Pending => {}
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        match me.poll_drain(cx) {
            Poll::Ready(Ok(())) => {}
            other => return other,
        }
        Pin::new(&mut me.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        if me.cr_pending {
            me.out.push(b'\r');
            me.cr_pending = false;
        }
        match me.poll_drain(cx) {
            Poll::Ready(Ok(())) => {}
            other => return other,
        }
        Pin::new(&mut me.inner).poll_shutdown(cx)
    }
}
