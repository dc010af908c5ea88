use std::sync::{Arc, Mutex};

use buildlog_core::event::{Diagnostic, EventHeader, Importance};

use super::*;

fn recording_handler(received: &Arc<Mutex<Vec<String>>>, name: &'static str) -> EventHandler {
    let received = Arc::clone(received);
    Box::new(move |event: &EventRecord| {
        received
            .lock()
            .unwrap()
            .push(format!("{name}:{}", event.kind()));
    })
}

fn warning() -> EventRecord {
    EventRecord::Warning(Diagnostic {
        header: EventHeader::new("Test", "warning"),
        ..Default::default()
    })
}

#[test]
fn dispatch_to_all_subscribers_in_order() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut hub = EventHub::new();
    hub.subscribe(recording_handler(&received, "a")).unwrap();
    hub.subscribe(recording_handler(&received, "b")).unwrap();
    assert_eq!(2, hub.subscriber_count());
    hub.dispatch_event(&warning());
    hub.dispatch_event(&EventRecord::message_with_importance(
        EventHeader::default(),
        Importance::Low,
    ));
    assert_eq!(
        vec!["a:Warning", "b:Warning", "a:Message", "b:Message"],
        *received.lock().unwrap()
    );
}

#[test]
fn unsubscribed_handlers_receive_nothing() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut hub = EventHub::new();
    let a = hub.subscribe(recording_handler(&received, "a")).unwrap();
    hub.subscribe(recording_handler(&received, "b")).unwrap();
    assert!(hub.unsubscribe(a));
    assert!(!hub.unsubscribe(a));
    hub.dispatch_event(&warning());
    assert_eq!(vec!["b:Warning"], *received.lock().unwrap());
}

#[test]
fn reject_subscribers_beyond_limit() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut hub = EventHub::with_max_subscribers(NonZeroUsize::new(1).unwrap());
    let first = hub.subscribe(recording_handler(&received, "a")).unwrap();
    assert_eq!(
        Err(SubscribeError::TooManySubscribers { max: 1 }),
        hub.subscribe(recording_handler(&received, "b"))
    );
    assert!(hub.unsubscribe(first));
    assert!(hub.subscribe(recording_handler(&received, "b")).is_ok());
}

#[test]
fn publish_without_subscribers() {
    let (pubsub, _subscriber) = EventPubSub::<String, u32>::new("test", 1);
    // Must not panic or block
    pubsub.publish_event(1);
}

#[test]
fn publish_to_subscribers() {
    let (pubsub, subscriber) = EventPubSub::<String, u32>::new("test", 4);
    let mut rx = subscriber.subscribe();
    pubsub.publish_event(7);
    let event = rx.try_recv().unwrap();
    assert_eq!("test", event.publisher);
    assert_eq!(7, event.payload);
    assert!(rx.try_recv().is_err());
}
