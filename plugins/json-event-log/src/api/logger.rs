use std::sync::Arc;

use parking_lot::Mutex;

use buildlog_core::{config::parse_log_file_path, EventRecord};
use buildlog_plugin::{EventSource, SubscriptionId};

use crate::{
    internal::{
        context::Context,
        event_handler::{create_event_handler, handle_event},
    },
    Error, EventPubSub, Result,
};

use super::{
    event::{Event, LifecycleEvent},
    Config, State, Status,
};

/// Writes build events into a JSON file
///
/// The file is opened by [`JsonEventLogger::initialize`] and closed
/// by [`JsonEventLogger::shutdown`] or when the logger is dropped,
/// whatever happens first.
#[derive(Debug)]
pub struct JsonEventLogger {
    // Shared with the handler that is registered at the event source
    context: Arc<Mutex<Context>>,
    event_pubsub: EventPubSub,
    subscription: Option<SubscriptionId>,
}

impl JsonEventLogger {
    pub(crate) fn new(context: Context, event_pubsub: EventPubSub) -> Self {
        Self {
            context: Arc::new(Mutex::new(context)),
            event_pubsub,
            subscription: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> Config {
        *self.context.lock().config()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.context.lock().status()
    }

    /// Open the log file and subscribe to build events
    ///
    /// `parameters` must contain exactly the path of the log file. No
    /// file is touched if the parameters are invalid. The file is closed
    /// again if subscribing fails.
    pub fn initialize(
        &mut self,
        parameters: Option<&str>,
        event_source: &mut dyn EventSource,
    ) -> Result<()> {
        if self.subscription.is_some() || self.context.lock().state() != State::Inactive {
            return Err(Error::InvalidState);
        }
        let output_path = parse_log_file_path(parameters)?;
        self.context.lock().activate(&output_path)?;
        let handler = create_event_handler(Arc::clone(&self.context), self.event_pubsub.clone());
        match event_source.subscribe(handler) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
            }
            Err(err) => {
                log::warn!("Failed to subscribe for build events: {}", err);
                if let Err(err) = self.context.lock().terminate() {
                    log::warn!("Failed to close {}: {}", output_path.display(), err);
                }
                return Err(err.into());
            }
        }
        log::info!("Logging build events into {}", output_path.display());
        self.event_pubsub
            .publish_event(Event::Lifecycle(LifecycleEvent::Started { output_path }));
        Ok(())
    }

    /// Record a single event without an event source
    pub fn handle_event(&self, event: &EventRecord) {
        handle_event(&self.context, &self.event_pubsub, event);
    }

    /// Unsubscribe from build events and close the log file
    ///
    /// Repeated invocations have no effect.
    pub fn shutdown(&mut self, event_source: &mut dyn EventSource) -> Result<()> {
        if let Some(subscription) = self.subscription.take() {
            if !event_source.unsubscribe(subscription) {
                log::warn!("Unknown subscription {:?}", subscription);
            }
        }
        self.terminate()
    }

    fn terminate(&mut self) -> Result<()> {
        let mut context = self.context.lock();
        let last_state = context.state();
        if last_state == State::Terminated {
            return Ok(());
        }
        let terminated = context.terminate();
        let elements_written = context.status().elements_written;
        drop(context);
        if last_state == State::Active {
            log::info!(
                "Stopped logging build events after writing {} element(s)",
                elements_written
            );
            self.event_pubsub
                .publish_event(Event::Lifecycle(LifecycleEvent::Stopped { elements_written }));
        }
        terminated
    }
}

impl Drop for JsonEventLogger {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription {
            log::warn!(
                "Dropping logger without unsubscribing {:?} from the event source",
                subscription
            );
        }
        if let Err(err) = self.terminate() {
            log::warn!("Failed to close the log: {}", err);
        }
    }
}

#[cfg(test)]
mod tests;
