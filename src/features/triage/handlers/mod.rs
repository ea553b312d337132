mod triage_handler;

pub use triage_handler::*;
