//! Liveness and dependency report

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    Connected,
    Disconnected,
}

impl Dependency {
    fn from_check(up: bool) -> Self {
        if up {
            Dependency::Connected
        } else {
            Dependency::Disconnected
        }
    }
}

/// `healthy` when the ledger can both read its rows and store images,
/// `degraded` otherwise. The endpoint itself always answers 200.
#[derive(Debug, Serialize)]
pub struct LedgerHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub database: Dependency,
    pub attachments: Dependency,
}

impl LedgerHealth {
    fn new(database: Dependency, attachments: Dependency) -> Self {
        let status = if database == Dependency::Connected && attachments == Dependency::Connected {
            "healthy"
        } else {
            "degraded"
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            attachments,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<LedgerHealth> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => Dependency::Connected,
        Err(e) => {
            tracing::warn!("Ledger database unreachable: {}", e);
            Dependency::Disconnected
        }
    };
    let attachments = Dependency::from_check(state.attachments.is_available().await);
    if attachments == Dependency::Disconnected {
        tracing::warn!("Attachment directory {} is not writable", state.config.uploads.directory);
    }

    Json(LedgerHealth::new(database, attachments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_dependency_down_degrades() {
        assert_eq!(LedgerHealth::new(Dependency::Connected, Dependency::Connected).status, "healthy");
        assert_eq!(LedgerHealth::new(Dependency::Disconnected, Dependency::Connected).status, "degraded");
        assert_eq!(LedgerHealth::new(Dependency::Connected, Dependency::Disconnected).status, "degraded");
    }

    #[test]
    fn test_dependencies_serialize_lowercase() {
        let json = serde_json::to_value(LedgerHealth::new(Dependency::Disconnected, Dependency::Connected)).unwrap();
        assert_eq!(json["database"], "disconnected");
        assert_eq!(json["attachments"], "connected");
    }
}
