//! Core traits shared across layers.

use async_trait::async_trait;
use serde::Serialize;

/// Trait for health checks.
///
/// Implemented by the store pool and the cache so the readiness endpoint can
/// check both without knowing their concrete types.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Returns the name of this health check.
    fn name(&self) -> &str;

    /// Performs the health check.
    async fn check(&self) -> HealthStatus;
}

/// Health check status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum HealthStatus {
    /// The component is healthy.
    Healthy,
    /// The component is degraded but functional.
    Degraded(String),
    /// The component is unhealthy.
    Unhealthy(String),
}

impl HealthStatus {
    /// Returns true if the status is healthy.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Returns true if the status is unhealthy.
    #[must_use]
    pub const fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_predicates() {
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(!HealthStatus::Degraded("slow".to_string()).is_healthy());
        assert!(!HealthStatus::Degraded("slow".to_string()).is_unhealthy());
        assert!(HealthStatus::Unhealthy("down".to_string()).is_unhealthy());
    }

    #[test]
    fn test_health_status_json_shape() {
        let json = serde_json::to_value(HealthStatus::Unhealthy("refused".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unhealthy", "detail": "refused" }));

        let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "healthy" }));
    }
}
