//! Byte source over any async reader

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::source::ByteSource;
use crate::{OximeterError, Result};

/// Default number of bytes pulled from the reader per read call.
pub const DEFAULT_READ_BUFFER: usize = 64;

/// Byte source reading from a [`tokio::io::AsyncRead`].
///
/// Works with sockets, pipes, `tokio::io::duplex` halves and plain byte
/// slices. Bytes are pulled in chunks and handed out one at a time; the
/// chunk size is an optimisation only.
pub struct ReaderSource<R> {
    /// Underlying reader
    reader: R,

    /// Chunk buffer
    buf: Box<[u8]>,

    /// Next unread position in `buf`
    pos: usize,

    /// Number of valid bytes in `buf`
    len: usize,

    /// Set once the reader reported end of stream
    eof: bool,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Wrap a reader with the default chunk size.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_READ_BUFFER)
    }

    /// Wrap a reader, reading up to `capacity` bytes per call.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            len: 0,
            eof: false,
        }
    }

    /// Consume the source, returning the reader.
    ///
    /// Bytes already buffered but not yet handed out are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait::async_trait]
impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.len {
            if self.eof {
                return Ok(None);
            }

            // `read` is cancel-safe: if this future is dropped no data was consumed
            let n = self
                .reader
                .read(&mut self.buf)
                .await
                .map_err(|e| OximeterError::io_error("reading oximeter stream", e))?;

            if n == 0 {
                debug!("Reader reached end of stream");
                self.eof = true;
                return Ok(None);
            }

            trace!("Read {} bytes", n);
            self.pos = 0;
            self.len = n;
        }

        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncWriteExt, ReadBuf};

    async fn drain<S: ByteSource>(source: &mut S) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(byte) = source.next_byte().await.expect("read") {
            out.push(byte);
        }
        out
    }

    #[tokio::test]
    async fn yields_bytes_in_order_then_none() {
        let data: &'static [u8] = &[1, 2, 3, 4, 5, 6, 7];
        let mut source = ReaderSource::with_capacity(data, 3);

        assert_eq!(drain(&mut source).await, data);
        assert_eq!(source.next_byte().await.expect("eof is not an error"), None);
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let data: &'static [u8] = &[9, 8];
        let mut source = ReaderSource::with_capacity(data, 0);
        assert_eq!(drain(&mut source).await, vec![9, 8]);
    }

    #[tokio::test]
    async fn reads_across_duplex_writes() {
        let (mut tx, rx) = tokio::io::duplex(16);
        let mut source = ReaderSource::new(rx);

        tokio::spawn(async move {
            tx.write_all(&[0x81, 0x00]).await.expect("write");
            tx.write_all(&[0x64, 0x05, 0xEA]).await.expect("write");
        });

        assert_eq!(drain(&mut source).await, vec![0x81, 0x00, 0x64, 0x05, 0xEA]);
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "link lost")))
        }
    }

    #[tokio::test]
    async fn read_failures_surface_as_io_errors() {
        let mut source = ReaderSource::new(FailingReader);
        let err = source.next_byte().await.expect_err("reader fails");
        assert!(matches!(err, OximeterError::Io { .. }));
        assert!(err.is_retryable());
    }
}
