mod dispatcher;
mod prediction_store;
mod triage_service;

pub use dispatcher::{Categorizer, LocalCategorizer, RemoteCategorizer, TriageDispatcher};
pub use prediction_store::{PgPredictionStore, PredictionStore};
pub use triage_service::TriageService;
