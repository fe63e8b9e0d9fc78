pub mod event_models;

pub use event_models::{CountTotals, CountingEvent};
