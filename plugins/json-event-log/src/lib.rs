// FIXME: Enable `deny(missing_docs)` before release
//#![deny(missing_docs)]

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::explicit_deref_methods)]
#![warn(clippy::explicit_into_iter_loop)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::must_use_candidate)]
#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), deny(clippy::panic_in_result_fn))]
#![cfg_attr(not(debug_assertions), deny(clippy::used_underscore_binding))]

use std::path::{Path, PathBuf};

use thiserror::Error;

use buildlog_core::{
    config::ConfigError,
    diagnostics::{Diagnostics, FileDiagnostics, LogDiagnostics},
    event::format::RecordFormat,
    filter::FilterPolicy,
    io::json,
    Verbosity,
};
use buildlog_plugin::SubscribeError;

pub mod api;
pub use self::api::JsonEventLogger;

mod internal;
use self::internal::context::Context;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Identifies the plugin in published events
    pub publisher_name: Option<String>,

    /// Directory for the diagnostics file
    ///
    /// Diagnostics are forwarded to the application log if unset.
    pub diagnostics_dir: Option<PathBuf>,
}

#[must_use]
pub fn default_config() -> api::Config {
    api::Config {
        verbosity: Verbosity::Normal,
        filter_policy: FilterPolicy::DiagnosticsOnly,
        record_format: RecordFormat::Tagged,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSetup {
    pub initial_config: api::Config,
}

impl Default for PluginSetup {
    fn default() -> Self {
        Self {
            initial_config: default_config(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Writer(#[from] json::Error),

    #[error(transparent)]
    Subscribe(#[from] SubscribeError),

    #[error("invalid state")]
    InvalidState,
}

pub type Result<T> = std::result::Result<T, Error>;

pub type PublishedEvent = buildlog_plugin::PublishedEvent<String, api::Event>;
pub type EventReceiver = buildlog_plugin::EventReceiver<String, api::Event>;
pub type EventSubscriber = buildlog_plugin::EventSubscriber<String, api::Event>;
type EventPubSub = buildlog_plugin::EventPubSub<String, api::Event>;

pub const DEFAULT_PUBLISHER_NAME: &str = "json-event-log";

#[derive(Debug)]
pub struct Plugin {
    pub logger: JsonEventLogger,
    pub event_subscriber: EventSubscriber,
}

fn create_diagnostics(diagnostics_dir: Option<&Path>) -> Box<dyn Diagnostics + Send> {
    let Some(diagnostics_dir) = diagnostics_dir else {
        return Box::new(LogDiagnostics);
    };
    match FileDiagnostics::create_in(diagnostics_dir) {
        Ok(diagnostics) => Box::new(diagnostics),
        Err(err) => {
            log::warn!(
                "Failed to create diagnostics file in {}: {}",
                diagnostics_dir.display(),
                err
            );
            Box::new(LogDiagnostics)
        }
    }
}

/// Create an inactive logger
///
/// The capacity of the event channel must not be zero.
#[must_use]
pub fn create_plugin(
    environment: Environment,
    plugin_setup: PluginSetup,
    event_channel_capacity: usize,
) -> Plugin {
    let Environment {
        publisher_name,
        diagnostics_dir,
    } = environment;
    let PluginSetup { initial_config } = plugin_setup;
    let (event_pubsub, event_subscriber) = EventPubSub::new(
        publisher_name.unwrap_or_else(|| DEFAULT_PUBLISHER_NAME.to_owned()),
        event_channel_capacity,
    );
    let diagnostics = create_diagnostics(diagnostics_dir.as_deref());
    let context = Context::new(initial_config, diagnostics);
    Plugin {
        logger: JsonEventLogger::new(context, event_pubsub),
        event_subscriber,
    }
}
