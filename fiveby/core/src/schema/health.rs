//! `GET /health` response

use serde::{Deserialize, Serialize};

use super::{Validate, ValidationError};

const OK: &str = "ok";

/// Database section of the health probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbHealth {
    /// `ok` when the database answers
    pub status: String,
}

/// Backend connectivity probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when the service is up
    pub status: String,
    /// Service name
    pub service: String,
    /// Database status
    pub db: DbHealth,
}

impl HealthResponse {
    /// Both the service and its database report `ok`
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == OK && self.db.status == OK
    }
}

impl Validate for HealthResponse {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::decode;
    use serde_json::json;

    #[test]
    fn test_degraded_db_is_not_healthy() {
        let health: HealthResponse = decode(json!({
            "status": "ok",
            "service": "five-by-backend",
            "db": {"status": "unreachable"}
        }))
        .unwrap();
        assert!(!health.is_healthy());
    }
}
