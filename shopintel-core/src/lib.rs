//! Client-side core of ShopIntel: the dataset-upload-to-insight workflow,
//! the admin console, the terms gate and report rendering.
//!
//! Backend collaborators are reached only through the traits in
//! [`services`]; `shopintel-gateway` provides the HTTP implementation.

pub mod admin;
pub mod app_context;
pub mod config;
pub mod errors;
pub mod models;
pub mod report;
pub mod services;
pub mod terms;
pub mod workflow;

pub use app_context::AppContext;
pub use config::ClientConfig;
pub use workflow::{AnalysisReport, DashboardView, WorkflowController, WorkflowPhase};
