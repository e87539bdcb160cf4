use crate::collation::compare_names;
use crate::schema::{Event, EventKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegateStats {
    pub portfolio: String,
    pub speeches: u32,
    pub points_of_order: u32,
    pub points_of_information: u32,
    pub total_participation: u32,
}

impl DelegateStats {
    fn zeroed(portfolio: &str) -> Self {
        Self {
            portfolio: portfolio.to_string(),
            speeches: 0,
            points_of_order: 0,
            points_of_information: 0,
            total_participation: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsTotals {
    pub speeches: u32,
    pub points_of_order: u32,
    pub points_of_information: u32,
    pub total_participation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub delegates: Vec<DelegateStats>,
    pub totals: StatsTotals,
    pub active_delegates: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Portfolio,
    Speeches,
    PointsOfOrder,
    PointsOfInformation,
    #[default]
    TotalParticipation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort option: {0}")]
pub struct UnknownSortOption(pub String);

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Portfolio,
        SortField::Speeches,
        SortField::PointsOfOrder,
        SortField::PointsOfInformation,
        SortField::TotalParticipation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Portfolio => "portfolio",
            SortField::Speeches => "speeches",
            SortField::PointsOfOrder => "pointsOfOrder",
            SortField::PointsOfInformation => "pointsOfInformation",
            SortField::TotalParticipation => "totalParticipation",
        }
    }

    fn count(&self, stats: &DelegateStats) -> u32 {
        match self {
            SortField::Portfolio => 0,
            SortField::Speeches => stats.speeches,
            SortField::PointsOfOrder => stats.points_of_order,
            SortField::PointsOfInformation => stats.points_of_information,
            SortField::TotalParticipation => stats.total_participation,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UnknownSortOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| UnknownSortOption(value.to_string()))
    }
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = UnknownSortOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(UnknownSortOption(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header behaviour: the active column flips direction, a new
    /// column starts descending.
    pub fn select(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Desc)
        }
    }
}

/// One record per roster portfolio, in roster order. Motions and events by
/// portfolios outside the roster are not counted.
pub fn compute_delegate_stats(events: &[Event], roster: &[String]) -> Vec<DelegateStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats = Vec::with_capacity(roster.len());
    for portfolio in roster {
        if !index.contains_key(portfolio.as_str()) {
            index.insert(portfolio.as_str(), stats.len());
            stats.push(DelegateStats::zeroed(portfolio));
        }
    }

    for event in events {
        let Some(&slot) = index.get(event.portfolio.as_str()) else {
            continue;
        };
        let entry = &mut stats[slot];
        match event.kind {
            EventKind::Speech => entry.speeches += 1,
            EventKind::PointOfOrder => entry.points_of_order += 1,
            EventKind::PointOfInformation => entry.points_of_information += 1,
            EventKind::Motion => continue,
        }
        entry.total_participation += 1;
    }

    stats
}

/// Stable sort; equal keys keep their relative order in either direction.
pub fn sort_stats(stats: &mut [DelegateStats], order: SortOrder) {
    stats.sort_by(|a, b| {
        let ordering = compare_by(a, b, order.field);
        match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &DelegateStats, b: &DelegateStats, field: SortField) -> Ordering {
    match field {
        SortField::Portfolio => compare_names(&a.portfolio, &b.portfolio),
        _ => field.count(a).cmp(&field.count(b)),
    }
}

pub fn totals(stats: &[DelegateStats]) -> StatsTotals {
    stats.iter().fold(StatsTotals::default(), |totals, delegate| StatsTotals {
        speeches: totals.speeches + delegate.speeches,
        points_of_order: totals.points_of_order + delegate.points_of_order,
        points_of_information: totals.points_of_information + delegate.points_of_information,
        total_participation: totals.total_participation + delegate.total_participation,
    })
}

pub fn active_delegates(stats: &[DelegateStats]) -> usize {
    stats
        .iter()
        .filter(|delegate| delegate.total_participation > 0)
        .count()
}

pub fn analyze(events: &[Event], roster: &[String], order: SortOrder) -> Analytics {
    let mut delegates = compute_delegate_stats(events, roster);
    sort_stats(&mut delegates, order);
    Analytics {
        totals: totals(&delegates),
        active_delegates: active_delegates(&delegates),
        delegates,
    }
}
