//! Logs a short, made-up build into a JSON file
//!
//! Usage: `replay-build-events <log file> [verbosity]`
use std::env;

use anyhow::Result;

use buildlog::{
    core::{
        event::{Diagnostic, EventHeader, Importance, Other, ProjectFinished, ProjectStarted},
        EventRecord, Verbosity,
    },
    json_event_log::{
        api::{Config, Event},
        create_plugin, default_config, Environment, Plugin, PluginSetup,
    },
    plugin::{EventDispatcher as _, EventHub},
};

fn build_events() -> Vec<EventRecord> {
    vec![
        EventRecord::Other(Other {
            header: EventHeader::new("Engine", "Build started."),
            event_type: "BuildStarted".to_owned(),
        }),
        EventRecord::ProjectStarted(ProjectStarted {
            header: EventHeader::new("Engine", "Project \"App.csproj\" started."),
            project_file: "App.csproj".to_owned(),
            target_names: Some("Build".to_owned()),
        }),
        EventRecord::message_with_importance(
            EventHeader::new("Csc", "Compiling 12 files"),
            Importance::High,
        ),
        EventRecord::message_with_importance(
            EventHeader::new("Csc", "csc.exe /noconfig /nowarn:1701"),
            Importance::Low,
        ),
        EventRecord::Warning(Diagnostic {
            header: EventHeader::new("Csc", "The variable 'e' is declared but never used"),
            code: Some("CS0168".to_owned()),
            file: Some("Program.cs".to_owned()),
            line_number: 17,
            column_number: 13,
            ..Default::default()
        }),
        EventRecord::ProjectFinished(ProjectFinished {
            header: EventHeader::new("Engine", "Done building project \"App.csproj\"."),
            project_file: "App.csproj".to_owned(),
            succeeded: true,
        }),
    ]
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    let mut args = env::args().skip(1);
    let parameters = args.next();
    let verbosity = args
        .next()
        .map(|arg| arg.parse::<Verbosity>())
        .transpose()?
        .unwrap_or_default();

    let Plugin {
        mut logger,
        event_subscriber,
    } = create_plugin(
        Environment::default(),
        PluginSetup {
            initial_config: Config {
                verbosity,
                ..default_config()
            },
        },
        100,
    );
    let mut event_rx = event_subscriber.subscribe();

    let mut hub = EventHub::new();
    logger.initialize(parameters.as_deref(), &mut hub)?;
    for event in build_events() {
        hub.dispatch_event(&event);
    }
    logger.shutdown(&mut hub)?;

    while let Ok(published) = event_rx.try_recv() {
        if let Event::Incident(incident) = published.payload {
            log::warn!("{:?}", incident);
        }
    }
    log::info!("{:?}", logger.status());
    Ok(())
}
