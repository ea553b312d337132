pub mod audit_logs;
pub mod auth;
pub mod comments;
pub mod complaints;
pub mod dashboard;
pub mod feedback;
pub mod notifications;
pub mod profiles;
pub mod realtime;
pub mod triage;
pub mod whatsapp;
