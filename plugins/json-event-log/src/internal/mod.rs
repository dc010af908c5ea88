pub(crate) mod context;
pub(crate) mod event_handler;
