//! Core library for FinOps Sentinel
//!
//! This crate provides the core functionality for:
//! - Waste classification of subscription resources
//! - Windowed metric sampling
//! - Idempotent status tagging
//! - Report aggregation and rendering
//! - Run coordination, health checks and observability

pub mod classify;
pub mod cloud;
pub mod config;
pub mod coordinator;
pub mod health;
pub mod models;
pub mod observability;
pub mod report;
pub mod sampler;
pub mod scanner;
pub mod tagger;

pub use config::{ConfigError, SentinelConfig};
pub use coordinator::{Coordinator, CoordinatorBuilder, RunState, RunSummary};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{SentinelMetrics, StructuredLogger};
