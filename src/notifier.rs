//! Event notification boundary.
//!
//! The coordinator publishes [`BookingEvent`]s fire-and-forget into a
//! bounded channel; a consumer task drains the channel and fans each event
//! out to notification handlers (email, in-app, …). Handler failures are
//! logged and never propagate back to the booking caller; the booking has
//! already committed by the time an event exists.

use crate::events::BookingEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure inside a notification handler. Logged, never retried by the
/// coordinator.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Delivery to the downstream channel failed
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Publisher side of the notification boundary.
///
/// `publish` must not block and must not fail the caller: the booking
/// transaction has already committed when an event is produced.
pub trait EventNotifier: Send + Sync {
    /// Hand an event to the notification side, best-effort.
    fn publish(&self, event: BookingEvent);
}

/// Channel-backed notifier: events go into a bounded `mpsc` queue consumed
/// by a [`NotificationConsumer`].
pub struct ChannelNotifier {
    tx: mpsc::Sender<BookingEvent>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver to drive a consumer with.
    #[must_use]
    pub fn new(queue_depth: usize) -> (Self, mpsc::Receiver<BookingEvent>) {
        let (tx, rx) = mpsc::channel(queue_depth);
        (Self { tx }, rx)
    }
}

impl EventNotifier for ChannelNotifier {
    fn publish(&self, event: BookingEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    kind = event.kind(),
                    appointment_id = %event.appointment_id(),
                    "Notification queue full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::warn!(
                    kind = event.kind(),
                    appointment_id = %event.appointment_id(),
                    "Notification consumer gone, dropping event"
                );
            }
        }
    }
}

/// A notifier that drops every event. Useful where the notification side is
/// irrelevant (tools, some tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl EventNotifier for NoopNotifier {
    fn publish(&self, _event: BookingEvent) {}
}

/// A single notification delivery mechanism.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Handler name, for logs
    fn name(&self) -> &'static str;

    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails; the consumer logs
    /// and moves on.
    async fn handle(&self, event: &BookingEvent) -> Result<(), NotificationError>;
}

/// Handler that records deliveries in the log. Stands in for the external
/// email/in-app delivery consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationHandler;

#[async_trait]
impl NotificationHandler for LogNotificationHandler {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn handle(&self, event: &BookingEvent) -> Result<(), NotificationError> {
        tracing::info!(
            kind = event.kind(),
            appointment_id = %event.appointment_id(),
            doctor_id = %event.doctor_id(),
            "Notification delivered"
        );
        Ok(())
    }
}

/// Drains the event channel and fans out to handlers.
pub struct NotificationConsumer {
    rx: mpsc::Receiver<BookingEvent>,
    handlers: Vec<Arc<dyn NotificationHandler>>,
}

impl NotificationConsumer {
    /// Creates a consumer over the receiver half of a [`ChannelNotifier`]
    #[must_use]
    pub fn new(
        rx: mpsc::Receiver<BookingEvent>,
        handlers: Vec<Arc<dyn NotificationHandler>>,
    ) -> Self {
        Self { rx, handlers }
    }

    /// Run until the publisher side is dropped. Spawn this on the runtime.
    pub async fn run(mut self) {
        tracing::info!(handlers = self.handlers.len(), "Notification consumer started");

        while let Some(event) = self.rx.recv().await {
            for handler in &self.handlers {
                if let Err(err) = handler.handle(&event).await {
                    tracing::error!(
                        handler = handler.name(),
                        kind = event.kind(),
                        appointment_id = %event.appointment_id(),
                        error = %err,
                        "Notification handler failed"
                    );
                }
            }
        }

        tracing::info!("Notification consumer stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AppointmentId, DoctorId, PatientId};

    fn cancelled_event() -> BookingEvent {
        BookingEvent::AppointmentCancelled {
            appointment_id: AppointmentId::new(),
            patient_id: PatientId::new(),
            doctor_id: DoctorId::new(),
        }
    }

    #[tokio::test]
    async fn publish_delivers_to_consumer() {
        let (notifier, mut rx) = ChannelNotifier::new(8);
        let event = cancelled_event();
        notifier.publish(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn publish_on_full_queue_drops_without_blocking() {
        let (notifier, mut rx) = ChannelNotifier::new(1);
        notifier.publish(cancelled_event());
        notifier.publish(cancelled_event()); // dropped, queue is full

        rx.recv().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failing_handler_does_not_stop_the_consumer() {
        struct FailingHandler;

        #[async_trait]
        impl NotificationHandler for FailingHandler {
            fn name(&self) -> &'static str {
                "failing"
            }

            async fn handle(&self, _event: &BookingEvent) -> Result<(), NotificationError> {
                Err(NotificationError::Delivery("smtp unreachable".into()))
            }
        }

        struct CountingHandler(tokio::sync::mpsc::UnboundedSender<()>);

        #[async_trait]
        impl NotificationHandler for CountingHandler {
            fn name(&self) -> &'static str {
                "counting"
            }

            async fn handle(&self, _event: &BookingEvent) -> Result<(), NotificationError> {
                self.0.send(()).map_err(|e| NotificationError::Delivery(e.to_string()))
            }
        }

        let (notifier, rx) = ChannelNotifier::new(8);
        let (count_tx, mut count_rx) = tokio::sync::mpsc::unbounded_channel();
        let consumer = NotificationConsumer::new(
            rx,
            vec![Arc::new(FailingHandler), Arc::new(CountingHandler(count_tx))],
        );
        let task = tokio::spawn(consumer.run());

        notifier.publish(cancelled_event());
        notifier.publish(cancelled_event());

        count_rx.recv().await.unwrap();
        count_rx.recv().await.unwrap();

        drop(notifier);
        task.await.unwrap();
    }
}
