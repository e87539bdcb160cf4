//! Data Transfer Objects for API requests and responses

use mun_core::schema::{EventKind, MotionStatus, NewCommittee, NewEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ApiError, ApiResult};

// ============ Committee DTOs ============

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommitteeRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl CreateCommitteeRequest {
    pub fn validate(self) -> ApiResult<NewCommittee> {
        NewCommittee::new(self.name.as_deref(), self.password.as_deref())
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

/// Body of the delete and verify endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

impl PasswordRequest {
    pub fn require(self) -> ApiResult<String> {
        self.password
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Password is required".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplacePortfoliosRequest {
    pub portfolios: Option<Value>,
}

impl ReplacePortfoliosRequest {
    /// Names are kept as sent; only blank and repeated names are rejected.
    pub fn validate(self) -> ApiResult<Vec<String>> {
        let items = match self.portfolios {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(ApiError::BadRequest(
                    "Valid portfolios array is required".to_string(),
                ));
            }
        };

        let mut names = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(name) if !name.trim().is_empty() => names.push(name),
                _ => {
                    return Err(ApiError::BadRequest(
                        "All portfolios must be non-empty strings".to_string(),
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        if !names.iter().all(|name| seen.insert(name.as_str())) {
            return Err(ApiError::BadRequest("Duplicate portfolios found".to_string()));
        }

        Ok(names)
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============ Event DTOs ============

#[derive(Debug, Default, Deserialize)]
pub struct AddEventRequest {
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub details: Option<Value>,
}

/// Every field name the event forms have ever sent. Which ones apply depends
/// on the event type.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub portfolio: Option<String>,
    pub raiser: Option<String>,
    pub target: Option<String>,
    pub target_portfolio: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub motion_type: Option<String>,
    pub status: Option<String>,
    pub motion_status: Option<String>,
}

impl AddEventRequest {
    pub fn into_new_event(self) -> ApiResult<NewEvent> {
        let (Some(kind), Some(details)) = (self.kind, self.details) else {
            return Err(ApiError::BadRequest(
                "Type and details are required".to_string(),
            ));
        };
        if kind.is_null() || details.is_null() {
            return Err(ApiError::BadRequest(
                "Type and details are required".to_string(),
            ));
        }

        let kind: EventKind = kind
            .as_str()
            .and_then(|kind| kind.parse().ok())
            .ok_or_else(|| ApiError::BadRequest("Invalid event type".to_string()))?;

        if !details.is_object() {
            return Err(ApiError::BadRequest(
                "Event details must be an object".to_string(),
            ));
        }
        let details: EventDetails = serde_json::from_value(details)
            .map_err(|e| ApiError::BadRequest(format!("Invalid event details: {e}")))?;

        details.into_new_event(kind)
    }
}

impl EventDetails {
    pub fn into_new_event(self, kind: EventKind) -> ApiResult<NewEvent> {
        let subject = first_present(self.portfolio, self.raiser)
            .filter(|subject| !subject.trim().is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("Event details must name a portfolio".to_string())
            })?;
        let description = first_present(self.description, None);

        let event = match kind {
            EventKind::Speech => NewEvent::Speech {
                portfolio: subject,
                duration: first_present(self.duration, None),
                description,
            },
            EventKind::PointOfOrder => NewEvent::PointOfOrder {
                raiser: subject,
                target: first_present(self.target, self.target_portfolio),
                description,
            },
            EventKind::PointOfInformation => NewEvent::PointOfInformation {
                raiser: subject,
                target: first_present(self.target, self.target_portfolio),
                description,
            },
            EventKind::Motion => {
                let status = first_present(self.status, self.motion_status)
                    .map(|status| status.parse::<MotionStatus>())
                    .transpose()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                NewEvent::Motion {
                    raiser: subject,
                    motion_type: first_present(self.kind, self.motion_type),
                    status,
                    description,
                }
            }
        };

        Ok(event)
    }
}

/// First non-empty value among the aliases of one field.
fn first_present(primary: Option<String>, alias: Option<String>) -> Option<String> {
    primary
        .filter(|value| !value.is_empty())
        .or_else(|| alias.filter(|value| !value.is_empty()))
}

// ============ Analytics DTOs ============

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
}

// ============ Health DTOs ============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
