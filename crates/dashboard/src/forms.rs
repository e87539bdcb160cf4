//! Event entry forms. Each form only yields a `NewEvent` once its required
//! fields are filled in.

use mun_core::schema::{MotionStatus, NewEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechForm {
    pub portfolio: String,
    pub duration: String,
    pub description: String,
}

impl SpeechForm {
    pub fn is_ready(&self) -> bool {
        filled(&self.portfolio)
    }

    pub fn submit(&self) -> Option<NewEvent> {
        if !self.is_ready() {
            return None;
        }
        Some(NewEvent::Speech {
            portfolio: self.portfolio.clone(),
            duration: optional(&self.duration),
            description: optional(&self.description),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Order,
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointForm {
    pub kind: PointKind,
    pub raiser: String,
    pub target: String,
    pub description: String,
}

impl PointForm {
    pub fn new(kind: PointKind) -> Self {
        Self {
            kind,
            raiser: String::new(),
            target: String::new(),
            description: String::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        filled(&self.raiser) && filled(&self.target)
    }

    pub fn submit(&self) -> Option<NewEvent> {
        if !self.is_ready() {
            return None;
        }
        let raiser = self.raiser.clone();
        let target = Some(self.target.clone());
        let description = optional(&self.description);
        Some(match self.kind {
            PointKind::Order => NewEvent::PointOfOrder {
                raiser,
                target,
                description,
            },
            PointKind::Information => NewEvent::PointOfInformation {
                raiser,
                target,
                description,
            },
        })
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.kind);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionForm {
    pub raiser: String,
    pub motion_type: String,
    pub status: MotionStatus,
    pub description: String,
}

impl MotionForm {
    pub fn is_ready(&self) -> bool {
        filled(&self.raiser) && filled(&self.motion_type)
    }

    pub fn submit(&self) -> Option<NewEvent> {
        if !self.is_ready() {
            return None;
        }
        Some(NewEvent::Motion {
            raiser: self.raiser.clone(),
            motion_type: Some(self.motion_type.clone()),
            status: Some(self.status),
            description: optional(&self.description),
        })
    }

    /// Back to an empty form with a pending status.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn optional(value: &str) -> Option<String> {
    filled(value).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_needs_a_portfolio() {
        let mut form = SpeechForm {
            duration: "1 minute".to_string(),
            ..SpeechForm::default()
        };
        assert!(form.submit().is_none());

        form.portfolio = "Kenya".to_string();
        assert_eq!(
            form.submit(),
            Some(NewEvent::Speech {
                portfolio: "Kenya".to_string(),
                duration: Some("1 minute".to_string()),
                description: None,
            })
        );

        form.clear();
        assert_eq!(form, SpeechForm::default());
    }

    #[test]
    fn points_need_raiser_and_target() {
        let mut form = PointForm::new(PointKind::Information);
        form.raiser = "Peru".to_string();
        assert!(!form.is_ready());
        assert!(form.submit().is_none());

        form.target = "Chile".to_string();
        assert_eq!(
            form.submit(),
            Some(NewEvent::PointOfInformation {
                raiser: "Peru".to_string(),
                target: Some("Chile".to_string()),
                description: None,
            })
        );

        let mut order = PointForm::new(PointKind::Order);
        order.raiser = "Peru".to_string();
        order.target = "   ".to_string();
        assert!(order.submit().is_none());
        order.clear();
        assert_eq!(order.kind, PointKind::Order);
    }

    #[test]
    fn motion_defaults_to_pending() {
        let mut form = MotionForm {
            raiser: "Japan".to_string(),
            ..MotionForm::default()
        };
        assert!(form.submit().is_none());

        form.motion_type = "moderated_caucus".to_string();
        form.description = "10 minutes, 1 minute speaking time".to_string();
        assert_eq!(
            form.submit(),
            Some(NewEvent::Motion {
                raiser: "Japan".to_string(),
                motion_type: Some("moderated_caucus".to_string()),
                status: Some(MotionStatus::Pending),
                description: Some("10 minutes, 1 minute speaking time".to_string()),
            })
        );

        form.status = MotionStatus::Failed;
        form.clear();
        assert_eq!(form.status, MotionStatus::Pending);
    }
}
