use std::sync::Arc;

use parking_lot::Mutex;

use buildlog_core::{io::json, EventRecord};
use buildlog_plugin::EventHandler;

use crate::{
    api::event::{Event, IncidentEvent},
    Error, EventPubSub,
};

use super::context::{Context, ElementWritten, EventNotRecorded};

pub(crate) fn create_event_handler(
    context: Arc<Mutex<Context>>,
    event_pubsub: EventPubSub,
) -> EventHandler {
    Box::new(move |event: &EventRecord| handle_event(&context, &event_pubsub, event))
}

/// Record a single event
///
/// Failures are only reported and never affect subsequent events.
pub(crate) fn handle_event(
    context: &Mutex<Context>,
    event_pubsub: &EventPubSub,
    event: &EventRecord,
) {
    let result = context.lock().record_event(event);
    match result {
        Ok(Ok(ElementWritten(kind))) => {
            log::trace!("Recorded {} event", kind);
        }
        Ok(Err(EventNotRecorded::Rejected)) => {
            log::trace!("Rejected {} event", event.kind());
        }
        Err(Error::Writer(json::Error::Serialization(err))) => {
            log::warn!("Dropped {} event: {}", event.kind(), err);
            event_pubsub.publish_event(Event::Incident(IncidentEvent::ElementDropped {
                kind: event.kind(),
                reason: err.to_string(),
            }));
        }
        Err(Error::Writer(json::Error::Io(err))) => {
            log::warn!("Failed to write {} event: {}", event.kind(), err);
            event_pubsub.publish_event(Event::Incident(IncidentEvent::IoWriteError {
                os_code: err.raw_os_error(),
                message: err.to_string(),
            }));
        }
        Err(err) => {
            // Already logged
            log::debug!("Discarded {} event: {}", event.kind(), err);
        }
    }
}
