mod profile_handler;

pub use profile_handler::*;
