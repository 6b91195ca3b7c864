//! Shared enums and small value types referenced by both state and catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a city department, e.g. "finance", "police".
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub String);

impl DepartmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position ladder inside a department, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Intern,
    Specialist,
    SeniorSpecialist,
    Manager,
    Deputy,
    Head,
}

impl Position {
    /// Fixed promotion order.
    pub const LADDER: [Position; 6] = [
        Position::Intern,
        Position::Specialist,
        Position::SeniorSpecialist,
        Position::Manager,
        Position::Deputy,
        Position::Head,
    ];

    /// The position one step above, or `None` at the top of the ladder.
    pub fn next(self) -> Option<Position> {
        let idx = Self::LADDER.iter().position(|p| *p == self)?;
        Self::LADDER.get(idx + 1).copied()
    }
}

/// Relationship with an external agency. Ordered from worst to best.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceLevel {
    Hostile,
    Unfriendly,
    #[default]
    Neutral,
    Friendly,
    Controlled,
}

impl InfluenceLevel {
    const LADDER: [InfluenceLevel; 5] = [
        InfluenceLevel::Hostile,
        InfluenceLevel::Unfriendly,
        InfluenceLevel::Neutral,
        InfluenceLevel::Friendly,
        InfluenceLevel::Controlled,
    ];

    fn index(self) -> usize {
        Self::LADDER.iter().position(|l| *l == self).unwrap_or(2)
    }

    /// One step toward `Controlled`; saturates at the top.
    pub fn improved(self) -> InfluenceLevel {
        let idx = (self.index() + 1).min(Self::LADDER.len() - 1);
        Self::LADDER[idx]
    }

    /// One step toward `Hostile`; saturates at the bottom.
    pub fn worsened(self) -> InfluenceLevel {
        Self::LADDER[self.index().saturating_sub(1)]
    }

    /// Additive success-probability modifier for operations against an agency.
    pub fn success_modifier(self) -> f32 {
        match self {
            InfluenceLevel::Hostile => -20.0,
            InfluenceLevel::Unfriendly => -10.0,
            InfluenceLevel::Neutral => 0.0,
            InfluenceLevel::Friendly => 10.0,
            InfluenceLevel::Controlled => 20.0,
        }
    }
}

/// Urgency of a citizen issue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn multiplier(self) -> f32 {
        match self {
            Urgency::Critical => 1.5,
            Urgency::High => 1.2,
            Urgency::Medium => 1.0,
            Urgency::Low => 0.8,
        }
    }
}

/// How the mayor answers a citizen issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Funding,
    Promise,
    Explanation,
    Ignore,
}

/// Lines of city taxation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    Property,
    Income,
    Business,
    Sales,
}

impl TaxKind {
    pub const ALL: [TaxKind; 4] = [
        TaxKind::Property,
        TaxKind::Income,
        TaxKind::Business,
        TaxKind::Sales,
    ];
}

/// Loan category; decides which account receives the proceeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    Personal,
    Business,
    City,
}

/// Kind of covert security operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Bribery,
    Blackmail,
    Surveillance,
    Disinformation,
    LegalDefense,
}

impl OperationKind {
    /// Bribery-class operations are paid out of the mayor's own pocket.
    pub fn uses_personal_funds(self) -> bool {
        matches!(self, OperationKind::Bribery | OperationKind::Blackmail)
    }
}

/// Kind of personal purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingKind {
    OneTime,
    Recurring,
    Investment,
}

/// Coarse health tier of the city budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Surplus,
    Balanced,
    Deficit,
    Critical,
}

/// Additive shifts applied to city-wide and government metrics.
///
/// Fields left out of a catalog entry default to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricEffects {
    pub mayor_rating: f32,
    pub happiness: f32,
    pub infrastructure: f32,
    pub ecology: f32,
    pub unemployment: f32,
    /// Mood shift for every employee of the owning department.
    pub employee_mood: f32,
    /// Shift of the government corruption-risk metric.
    pub corruption_risk: f32,
}

impl MetricEffects {
    pub fn is_empty(&self) -> bool {
        *self == MetricEffects::default()
    }
}
