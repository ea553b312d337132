mod graph_api;

pub use graph_api::{GraphApiClient, MessagingClient};

#[cfg(test)]
pub use graph_api::MediaInfo;
