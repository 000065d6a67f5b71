//! HTTP handlers for all API routes.

pub mod analyze;
pub mod news;
pub mod scoring;
pub mod system;
