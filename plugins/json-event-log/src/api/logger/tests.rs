use std::{fs, num::NonZeroUsize, path::Path};

use serde_json::Value;
use tempfile::TempDir;

use buildlog_core::{
    config::ConfigError,
    event::{Diagnostic, EventHeader, Importance},
    io::json,
};
use buildlog_plugin::{EventDispatcher as _, EventHub, SubscribeError};

use crate::{
    api::event::IncidentEvent, create_plugin, default_config, Environment, Plugin, PluginSetup,
};

use super::*;

fn new_plugin(config: Config) -> Plugin {
    create_plugin(
        Environment::default(),
        PluginSetup {
            initial_config: config,
        },
        16,
    )
}

fn parameters(path: &Path) -> String {
    path.to_str().unwrap().to_owned()
}

fn read_log(path: &Path) -> Vec<Value> {
    let contents = fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

fn warning(message: &str) -> EventRecord {
    EventRecord::Warning(Diagnostic {
        header: EventHeader::new("Test", message),
        file: Some("Program.cs".to_owned()),
        line_number: 1,
        column_number: 2,
        ..Default::default()
    })
}

fn message(importance: Importance) -> EventRecord {
    EventRecord::message_with_importance(EventHeader::new("Test", "message"), importance)
}

#[test]
fn missing_parameters() {
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    assert!(matches!(
        logger.initialize(None, &mut hub),
        Err(Error::Config(ConfigError::NotSet))
    ));
    assert!(matches!(
        logger.initialize(Some(" ; "), &mut hub),
        Err(Error::Config(ConfigError::NotSet))
    ));
    assert_eq!(State::Inactive, logger.status().state);
    assert_eq!(0, hub.subscriber_count());
}

#[test]
fn too_many_parameters_touch_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.json");
    let second = temp_dir.path().join("second.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    let parameters = format!("{};{}", first.display(), second.display());
    assert!(matches!(
        logger.initialize(Some(&parameters), &mut hub),
        Err(Error::Config(ConfigError::TooManyParameters))
    ));
    assert!(!first.exists());
    assert!(!second.exists());
}

#[test]
fn unwritable_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    assert!(matches!(
        logger.initialize(Some(&parameters(&path)), &mut hub),
        Err(Error::Writer(json::Error::Open { .. }))
    ));
    assert_eq!(0, hub.subscriber_count());
    assert_eq!(State::Inactive, logger.status().state);
}

#[test]
fn close_file_if_subscribing_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::with_max_subscribers(NonZeroUsize::new(1).unwrap());
    hub.subscribe(Box::new(|_: &EventRecord| {})).unwrap();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    assert!(matches!(
        logger.initialize(Some(&parameters(&path)), &mut hub),
        Err(Error::Subscribe(SubscribeError::TooManySubscribers { .. }))
    ));
    assert_eq!(State::Terminated, logger.status().state);
    assert_eq!("[]", fs::read_to_string(&path).unwrap());
}

#[test]
fn initialize_twice() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    assert!(matches!(
        logger.initialize(Some(&parameters(&path)), &mut hub),
        Err(Error::InvalidState)
    ));
    assert_eq!(1, hub.subscriber_count());
    logger.shutdown(&mut hub).unwrap();
}

#[test]
fn log_events_delivered_by_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    assert_eq!(State::Active, logger.status().state);
    hub.dispatch_event(&warning("first"));
    hub.dispatch_event(&message(Importance::Low));
    hub.dispatch_event(&message(Importance::Normal));
    logger.shutdown(&mut hub).unwrap();
    assert_eq!(0, hub.subscriber_count());
    let log = read_log(&path);
    assert_eq!(2, log.len());
    assert_eq!("first", log[0]["Warning"]["Message"]);
    assert_eq!("Normal", log[1]["Message"]["Importance"]);
    let status = logger.status();
    assert_eq!(State::Terminated, status.state);
    assert_eq!(Some(path), status.output_path);
    assert_eq!(2, status.elements_written);
    assert_eq!(1, status.events_rejected);
    assert_eq!(0, status.events_dropped);
}

#[test]
fn shutdown_twice() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    logger.handle_event(&warning("only"));
    logger.shutdown(&mut hub).unwrap();
    let closed_once = fs::read_to_string(&path).unwrap();
    logger.shutdown(&mut hub).unwrap();
    drop(logger);
    assert_eq!(closed_once, fs::read_to_string(&path).unwrap());
    assert_eq!(1, read_log(&path).len());
}

#[test]
fn shutdown_without_initialize() {
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    logger.shutdown(&mut hub).unwrap();
    assert_eq!(State::Terminated, logger.status().state);
}

#[test]
fn drop_closes_the_log() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = new_plugin(default_config());
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    hub.dispatch_event(&warning("before drop"));
    drop(logger);
    assert_eq!(1, read_log(&path).len());
    // The orphaned handler must neither panic nor corrupt the log
    hub.dispatch_event(&warning("after drop"));
    assert_eq!(1, read_log(&path).len());
}

#[test]
fn publish_lifecycle_events() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin {
        mut logger,
        event_subscriber,
    } = new_plugin(default_config());
    let mut event_rx = event_subscriber.subscribe();
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    hub.dispatch_event(&warning("warning"));
    logger.shutdown(&mut hub).unwrap();
    assert_eq!(
        Event::Lifecycle(LifecycleEvent::Started {
            output_path: path.clone()
        }),
        event_rx.try_recv().unwrap().payload
    );
    assert_eq!(
        Event::Lifecycle(LifecycleEvent::Stopped {
            elements_written: 1
        }),
        event_rx.try_recv().unwrap().payload
    );
    assert!(event_rx.try_recv().is_err());
}

#[test]
fn no_incidents_while_everything_works() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin {
        mut logger,
        event_subscriber,
    } = new_plugin(default_config());
    let mut event_rx = event_subscriber.subscribe();
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    for _ in 0..10 {
        hub.dispatch_event(&warning("warning"));
    }
    logger.shutdown(&mut hub).unwrap();
    while let Ok(event) = event_rx.try_recv() {
        assert!(!matches!(
            event.payload,
            Event::Incident(IncidentEvent::ElementDropped { .. })
                | Event::Incident(IncidentEvent::IoWriteError { .. })
        ));
    }
}

#[test]
fn write_diagnostics_file() {
    let temp_dir = TempDir::new().unwrap();
    let diagnostics_dir = temp_dir.path().join("diagnostics");
    fs::create_dir(&diagnostics_dir).unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = create_plugin(
        Environment {
            diagnostics_dir: Some(diagnostics_dir.clone()),
            ..Default::default()
        },
        PluginSetup::default(),
        16,
    );
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    logger.shutdown(&mut hub).unwrap();
    let entries: Vec<_> = fs::read_dir(&diagnostics_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(1, entries.len());
    let diagnostics = fs::read_to_string(&entries[0]).unwrap();
    assert!(diagnostics.contains("Logging build events into"));
    assert!(diagnostics.contains("Closed log with 0 element(s)"));
}

#[test]
fn missing_diagnostics_dir_falls_back_to_application_log() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.json");
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = create_plugin(
        Environment {
            diagnostics_dir: Some(temp_dir.path().join("missing")),
            ..Default::default()
        },
        PluginSetup::default(),
        16,
    );
    logger.initialize(Some(&parameters(&path)), &mut hub).unwrap();
    logger.shutdown(&mut hub).unwrap();
    assert!(read_log(&path).is_empty());
}

#[test]
fn shutdown_without_initialize_writes_no_diagnostics() {
    let temp_dir = TempDir::new().unwrap();
    let mut hub = EventHub::new();
    let Plugin { mut logger, .. } = create_plugin(
        Environment {
            diagnostics_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        },
        PluginSetup::default(),
        16,
    );
    logger.shutdown(&mut hub).unwrap();
    drop(logger);
    let entries: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(1, entries.len());
    assert_eq!("", fs::read_to_string(&entries[0]).unwrap());
}
