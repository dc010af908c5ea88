// FIXME: Enable `deny(missing_docs)` before release
//#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::panic_in_result_fn))]
#![cfg_attr(not(debug_assertions), deny(clippy::used_underscore_binding))]

pub use buildlog_core as core;

#[cfg(feature = "plugin")]
pub use buildlog_plugin as plugin;

#[cfg(feature = "json-event-log")]
pub use buildlog_plugin_json_event_log as json_event_log;
