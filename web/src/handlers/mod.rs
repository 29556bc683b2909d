//! HTTP handlers shared by the server binary.

pub mod health;
pub mod websocket;

pub use health::{ReadinessProbe, health_check, readiness};
