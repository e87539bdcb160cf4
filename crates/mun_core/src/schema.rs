use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    pub id: String,
    pub name: String,
    pub portfolios: Vec<String>,
    pub created_at: String, // YYYY-MM-DDTHH:MM:SS.mmmZ
    pub portfolio_count: usize,
    pub has_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeSummary {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub portfolio_count: usize,
    pub has_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub committee_id: String,
    pub name: String, // delegate or country label
    pub created_at: String,
}

/// Validated input for a new committee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommittee {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitteeInputError {
    #[error("Committee name is required")]
    MissingName,
    #[error("Password must be at least 4 characters long")]
    ShortPassword,
}

impl NewCommittee {
    /// The name is stored trimmed; the password is stored exactly as given.
    /// Password length is measured in UTF-16 code units, as browsers report it.
    pub fn new(name: Option<&str>, password: Option<&str>) -> Result<Self, CommitteeInputError> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(CommitteeInputError::MissingName)?;
        let password = password
            .filter(|password| password.encode_utf16().count() >= MIN_PASSWORD_LEN)
            .ok_or(CommitteeInputError::ShortPassword)?;
        Ok(Self {
            name: name.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Speech,
    PointOfOrder,
    PointOfInformation,
    Motion,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid event type: {0}")]
pub struct UnknownEventKind(pub String);

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Speech,
        EventKind::PointOfOrder,
        EventKind::PointOfInformation,
        EventKind::Motion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Speech => "speech",
            EventKind::PointOfOrder => "point_of_order",
            EventKind::PointOfInformation => "point_of_information",
            EventKind::Motion => "motion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Speech => "Speech",
            EventKind::PointOfOrder => "Point of Order",
            EventKind::PointOfInformation => "Point of Information",
            EventKind::Motion => "Motion",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownEventKind(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MotionStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid motion status: {0}")]
pub struct UnknownMotionStatus(pub String);

impl MotionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionStatus::Pending => "pending",
            MotionStatus::Passed => "passed",
            MotionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MotionStatus {
    type Err = UnknownMotionStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(MotionStatus::Pending),
            "passed" => Ok(MotionStatus::Passed),
            "failed" => Ok(MotionStatus::Failed),
            _ => Err(UnknownMotionStatus(value.to_string())),
        }
    }
}

/// A stored committee event. `portfolio` is the acting delegate; it is free
/// text and may name a portfolio that is no longer on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub committee_id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub portfolio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_portfolio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_status: Option<MotionStatus>,
    pub timestamp: String,
}

/// An event about to be recorded, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewEvent {
    Speech {
        portfolio: String,
        duration: Option<String>,
        description: Option<String>,
    },
    PointOfOrder {
        raiser: String,
        target: Option<String>,
        description: Option<String>,
    },
    PointOfInformation {
        raiser: String,
        target: Option<String>,
        description: Option<String>,
    },
    Motion {
        raiser: String,
        motion_type: Option<String>,
        status: Option<MotionStatus>,
        description: Option<String>,
    },
}

impl NewEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            NewEvent::Speech { .. } => EventKind::Speech,
            NewEvent::PointOfOrder { .. } => EventKind::PointOfOrder,
            NewEvent::PointOfInformation { .. } => EventKind::PointOfInformation,
            NewEvent::Motion { .. } => EventKind::Motion,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            NewEvent::Speech { portfolio, .. } => portfolio,
            NewEvent::PointOfOrder { raiser, .. }
            | NewEvent::PointOfInformation { raiser, .. }
            | NewEvent::Motion { raiser, .. } => raiser,
        }
    }

    pub fn into_record(self, id: String, committee_id: String, timestamp: String) -> Event {
        let kind = self.kind();
        let mut event = Event {
            id,
            committee_id,
            kind,
            portfolio: String::new(),
            target_portfolio: None,
            duration: None,
            description: None,
            motion_type: None,
            motion_status: None,
            timestamp,
        };

        match self {
            NewEvent::Speech {
                portfolio,
                duration,
                description,
            } => {
                event.portfolio = portfolio;
                event.duration = duration;
                event.description = description;
            }
            NewEvent::PointOfOrder {
                raiser,
                target,
                description,
            }
            | NewEvent::PointOfInformation {
                raiser,
                target,
                description,
            } => {
                event.portfolio = raiser;
                event.target_portfolio = target;
                event.description = description;
            }
            NewEvent::Motion {
                raiser,
                motion_type,
                status,
                description,
            } => {
                event.portfolio = raiser;
                event.motion_type = motion_type;
                event.motion_status = Some(status.unwrap_or_default());
                event.description = description;
            }
        }

        event
    }
}
