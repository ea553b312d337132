mod realtime_handler;

pub use realtime_handler::*;
