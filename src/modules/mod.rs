//! Modules layer - Infrastructure components for external integrations
//!
//! Currently holds the object storage adapter used for complaint images.

pub mod storage;
