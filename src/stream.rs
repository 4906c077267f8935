//! Channel-backed packet stream

use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::types::{Packet, Reading};

pin_project! {
    /// Stream of complete packets delivered by a session's worker.
    ///
    /// Ends once the worker exits and every buffered packet has been taken.
    /// Dropping the stream makes the worker shut down at its next delivery.
    pub struct PacketStream {
        #[pin]
        inner: ReceiverStream<Packet>,
    }
}

impl PacketStream {
    /// Create a bounded channel whose sender feeds the returned stream.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Packet>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }

    pub fn new(receiver: mpsc::Receiver<Packet>) -> Self {
        Self { inner: ReceiverStream::new(receiver) }
    }

    /// Map every packet to a [`Reading`] stamped with the current time.
    pub fn readings(self) -> impl Stream<Item = Reading> + Send + 'static {
        self.map(|packet| Reading::now(&packet))
    }

    /// Stop accepting packets; already buffered ones can still be read.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl Stream for PacketStream {
    type Item = Packet;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
