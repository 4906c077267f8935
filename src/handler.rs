//! Packet consumers

use tokio::sync::mpsc;

use crate::types::Packet;
use crate::{OximeterError, Result};

/// Consumer of completed packets.
///
/// The driver awaits each call before reading the next byte, so a slow
/// handler slows the reader down rather than queueing packets. Returning an
/// error stops the driver.
#[async_trait::async_trait]
pub trait PacketHandler: Send + 'static {
    /// Receive one complete packet.
    async fn handle(&mut self, packet: Packet) -> Result<()>;
}

/// Delivery into a bounded channel; waits while the channel is full.
#[async_trait::async_trait]
impl PacketHandler for mpsc::Sender<Packet> {
    async fn handle(&mut self, packet: Packet) -> Result<()> {
        self.send(packet).await.map_err(|_| OximeterError::ConsumerClosed)
    }
}

/// Handler wrapping a synchronous closure; see [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Use a closure as a [`PacketHandler`].
///
/// ```rust
/// use pulseox::handler_fn;
///
/// let mut count = 0usize;
/// let _handler = handler_fn(move |_packet| {
///     count += 1;
///     Ok(())
/// });
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(Packet) -> Result<()> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait::async_trait]
impl<F> PacketHandler for FnHandler<F>
where
    F: FnMut(Packet) -> Result<()> + Send + 'static,
{
    async fn handle(&mut self, packet: Packet) -> Result<()> {
        (self.f)(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{packet_from_extras, sample_extras};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn sender_delivers_into_channel() {
        let (mut tx, mut rx) = mpsc::channel(1);
        let packet = packet_from_extras(&sample_extras());

        tx.handle(packet.clone()).await.expect("receiver alive");
        assert_eq!(rx.recv().await, Some(packet));
    }

    #[tokio::test]
    async fn closed_channel_reports_consumer_closed() {
        let (mut tx, rx) = mpsc::channel::<Packet>(1);
        drop(rx);

        let err = tx.handle(Packet::new()).await.expect_err("receiver gone");
        assert!(matches!(err, OximeterError::ConsumerClosed));
    }

    #[tokio::test]
    async fn closure_handler_sees_every_packet() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut handler = handler_fn(move |packet: Packet| {
            sink.lock().expect("lock").push(packet.len());
            Ok(())
        });

        handler.handle(packet_from_extras(&sample_extras())).await.expect("ok");
        handler.handle(Packet::new()).await.expect("ok");
        assert_eq!(*seen.lock().expect("lock"), vec![25, 0]);
    }

    #[tokio::test]
    async fn closure_errors_propagate() {
        let mut handler = handler_fn(|_| Err(OximeterError::ConsumerClosed));
        assert!(handler.handle(Packet::new()).await.is_err());
    }
}
