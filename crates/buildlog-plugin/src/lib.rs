// FIXME: Enable `deny(missing_docs)` before release
//#![deny(missing_docs)]

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), deny(clippy::panic_in_result_fn))]

use std::{fmt, num::NonZeroUsize, time::SystemTime};

use thiserror::Error;
use tokio::sync::broadcast;

use buildlog_core::EventRecord;

// ------ -------
// Event sources
// ------ -------

/// Receives every build event, one at a time
pub type EventHandler = Box<dyn FnMut(&EventRecord) + Send + 'static>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SubscribeError {
    #[error("too many subscribers (at most {max})")]
    TooManySubscribers { max: usize },
}

/// Push-based delivery of build events
///
/// Handlers are invoked synchronously and never concurrently.
pub trait EventSource {
    fn subscribe(&mut self, handler: EventHandler) -> Result<SubscriptionId, SubscribeError>;

    /// Returns `false` if the subscription was unknown
    fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool;
}

pub trait EventDispatcher<E> {
    fn dispatch_event(&mut self, event: E);
}

/// In-process event source that dispatches to all subscribers
/// in the order of subscription
#[derive(Default)]
pub struct EventHub {
    max_subscribers: Option<NonZeroUsize>,
    next_subscription_id: u64,
    handlers: Vec<(SubscriptionId, EventHandler)>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("max_subscribers", &self.max_subscribers)
            .field("subscriber_count", &self.handlers.len())
            .finish()
    }
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    #[must_use]
    pub fn with_max_subscribers(max_subscribers: NonZeroUsize) -> Self {
        Self {
            max_subscribers: Some(max_subscribers),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl EventSource for EventHub {
    fn subscribe(&mut self, handler: EventHandler) -> Result<SubscriptionId, SubscribeError> {
        if let Some(max) = self.max_subscribers {
            if self.handlers.len() >= max.get() {
                return Err(SubscribeError::TooManySubscribers { max: max.get() });
            }
        }
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.handlers.push((id, handler));
        log::debug!("Added subscriber {:?}", id);
        Ok(id)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let count_before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription);
        let removed = self.handlers.len() < count_before;
        if removed {
            log::debug!("Removed subscriber {:?}", subscription);
        }
        removed
    }
}

impl EventDispatcher<&EventRecord> for EventHub {
    fn dispatch_event(&mut self, event: &EventRecord) {
        if self.handlers.is_empty() {
            log::debug!("No subscribers for build event {:?}", event.kind());
            return;
        }
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }
}

// ------ -------
//  Broadcasting
// ------ -------

pub type BroadcastSender<T> = broadcast::Sender<T>;
pub type BroadcastReceiver<T> = broadcast::Receiver<T>;

#[derive(Debug, Clone)]
pub struct BroadcastSubscriber<T> {
    sender: BroadcastSender<T>,
}

impl<T> BroadcastSubscriber<T> {
    pub fn new(sender: BroadcastSender<T>) -> Self {
        Self { sender }
    }

    pub fn subscribe(&self) -> BroadcastReceiver<T> {
        self.sender.subscribe()
    }
}

pub fn broadcast_channel<T>(channel_capacity: usize) -> (BroadcastSender<T>, BroadcastSubscriber<T>)
where
    T: Clone,
{
    let (tx, _) = broadcast::channel(channel_capacity);
    let subscriber = BroadcastSubscriber::new(tx.clone());
    (tx, subscriber)
}

// ----- ------
// Notifications
// ----- ------

/// A notification about the plugin itself
#[derive(Debug, Clone)]
pub struct PublishedEvent<P, T> {
    pub publisher: P,
    pub published_at: SystemTime,
    pub payload: T,
}

pub type EventSender<P, T> = broadcast::Sender<PublishedEvent<P, T>>;
pub type EventReceiver<P, T> = broadcast::Receiver<PublishedEvent<P, T>>;
pub type EventSubscriber<P, T> = BroadcastSubscriber<PublishedEvent<P, T>>;

pub fn event_channel<P, T>(channel_capacity: usize) -> (EventSender<P, T>, EventSubscriber<P, T>)
where
    P: Clone,
    T: Clone,
{
    broadcast_channel(channel_capacity)
}

#[derive(Debug, Clone)]
pub struct EventPubSub<P, T> {
    publisher: P,
    event_tx: EventSender<P, T>,
}

impl<P, T> EventPubSub<P, T>
where
    P: fmt::Debug + Clone,
    T: fmt::Debug + Clone,
{
    pub fn new(publisher: impl Into<P>, channel_capacity: usize) -> (Self, EventSubscriber<P, T>) {
        let (event_tx, event_subscriber) = event_channel(channel_capacity);
        (
            Self {
                event_tx,
                publisher: publisher.into(),
            },
            event_subscriber,
        )
    }

    pub fn publish_event(&self, payload: T) {
        let event = PublishedEvent {
            publisher: self.publisher.clone(),
            published_at: SystemTime::now(),
            payload,
        };
        if let Err(event) = self.event_tx.send(event) {
            // Ignore all send errors that are expected if no subscribers
            // are connected.
            log::debug!("No subscribers for published event {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests;
