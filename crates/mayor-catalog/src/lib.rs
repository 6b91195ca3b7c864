#![deny(warnings)]

//! Static catalog data: the read-only templates commands refer to by id.
//!
//! A catalog is loaded once at startup (from YAML, or the embedded default)
//! and shared by reference with every resolver and handler. Nothing in the
//! engine mutates it.

use mayor_core::{
    AccountType, Agency, CitizenGroup, DepartmentId, Issue, LoanCategory, MetricEffects, Money,
    OperationKind, Position, SpendingKind, TaxKind, Threat,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const BUILTIN_CATALOG: &str = include_str!("../../../assets/catalog/default.yaml");

/// Catalog loading and validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} {id} references unknown department {department}")]
    UnknownDepartment {
        kind: &'static str,
        id: String,
        department: String,
    },
    #[error("{kind} {id}: {reason}")]
    InvalidEntry {
        kind: &'static str,
        id: String,
        reason: String,
    },
}

/// Anything addressable by a stable catalog id.
pub trait Template {
    fn id(&self) -> &str;
}

macro_rules! impl_template {
    ($($ty:ty),* $(,)?) => {
        $(impl Template for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

fn find<'a, T: Template>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|t| t.id() == id)
}

/// Starting balances and metrics of a new game.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConditions {
    pub balances: BTreeMap<AccountType, Money>,
    pub mayor_rating: f32,
    pub happiness: f32,
    pub infrastructure: f32,
    pub ecology: f32,
    pub unemployment: f32,
    pub tax_rates: BTreeMap<TaxKind, f32>,
    pub tax_base: BTreeMap<TaxKind, Money>,
    pub collection_efficiency: f32,
    pub evasion_rate: f32,
    pub infrastructure_quality: f32,
    pub coverage: f32,
    pub protection_level: f32,
    pub investigation_risk: f32,
    pub corruption_risk: f32,
}

impl Default for StartConditions {
    fn default() -> Self {
        Self {
            balances: BTreeMap::new(),
            mayor_rating: 50.0,
            happiness: 50.0,
            infrastructure: 50.0,
            ecology: 50.0,
            unemployment: 8.0,
            tax_rates: BTreeMap::new(),
            tax_base: BTreeMap::new(),
            collection_efficiency: 80.0,
            evasion_rate: 10.0,
            infrastructure_quality: 50.0,
            coverage: 40.0,
            protection_level: 20.0,
            investigation_risk: 10.0,
            corruption_risk: 10.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepartmentTemplate {
    pub id: DepartmentId,
    pub name: String,
    pub budget: Money,
    #[serde(default = "default_satisfaction")]
    pub satisfaction: f32,
}

fn default_satisfaction() -> f32 {
    60.0
}

/// A person who can work for the city: initial staff or a hiring candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmployeeTemplate {
    pub id: String,
    pub name: String,
    /// Required for initial staff; a preference for candidates.
    #[serde(default)]
    pub department: Option<DepartmentId>,
    pub position: Position,
    pub competence: f32,
    pub mood: f32,
    pub workload: f32,
    pub loyalty: f32,
    pub experience_years: f32,
    pub salary: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyTemplate {
    pub id: String,
    pub name: String,
    /// Department that must run the policy; `None` means any department.
    #[serde(default)]
    pub department: Option<DepartmentId>,
    pub cost: Money,
    pub duration_months: u32,
    #[serde(default)]
    pub min_efficiency: f32,
    #[serde(default)]
    pub effects: MetricEffects,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaxPolicyTemplate {
    pub id: String,
    pub name: String,
    pub tax: TaxKind,
    /// Percentage points added to the tax line's rate.
    pub rate_change: f32,
    pub cost: Money,
    pub duration_months: u32,
    #[serde(default)]
    pub min_mayor_rating: f32,
    #[serde(default)]
    pub effects: MetricEffects,
}

/// A tradable instrument.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    /// Reference quote; trades carry their own price.
    pub price: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoanOffer {
    pub id: String,
    pub name: String,
    pub category: LoanCategory,
    pub amount: Money,
    pub annual_rate: f32,
    pub term_months: u32,
    pub min_credit_rating: u16,
}

impl LoanOffer {
    /// Account the loan proceeds are paid into.
    pub fn payout_account(&self) -> AccountType {
        match self.category {
            LoanCategory::Personal => AccountType::PersonalChecking,
            LoanCategory::Business => AccountType::CitySavings,
            LoanCategory::City => AccountType::CityChecking,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositOffer {
    pub id: String,
    pub name: String,
    pub annual_rate: f32,
    pub term_months: u32,
    pub min_amount: Money,
    pub max_amount: Money,
}

impl DepositOffer {
    /// Offers whose id starts with `city_` are funded by the city; all
    /// others by the mayor's personal checking account.
    pub fn funding_account(&self) -> AccountType {
        if self.id.starts_with("city_") {
            AccountType::CityChecking
        } else {
            AccountType::PersonalChecking
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvestmentTemplate {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub cost: Money,
    pub annual_return: f32,
    pub duration_months: u32,
    #[serde(default)]
    pub min_mayor_rating: f32,
    /// Share of the cost (percent) kicked back to the mayor's savings.
    #[serde(default)]
    pub personal_kickback_pct: Option<f32>,
    /// Flat bonus paid to the mayor's savings.
    #[serde(default)]
    pub personal_bonus: Option<Money>,
    #[serde(default)]
    pub effects: MetricEffects,
}

impl InvestmentTemplate {
    /// Total personal kickback owed on this investment.
    pub fn kickback_amount(&self) -> Money {
        let pct = self
            .personal_kickback_pct
            .and_then(Decimal::from_f32_retain)
            .unwrap_or(Decimal::ZERO);
        let bonus = self.personal_bonus.unwrap_or(Decimal::ZERO);
        (self.cost * pct / Decimal::ONE_HUNDRED).round_dp(2) + bonus
    }
}

/// A selectable under-the-table add-on to a project.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KickbackOption {
    pub id: String,
    pub name: String,
    pub amount: Money,
    /// Added to the government corruption risk when selected.
    pub risk: f32,
    /// Quality points lost on construction projects.
    #[serde(default)]
    pub quality_penalty: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndustrialProjectTemplate {
    pub id: String,
    pub name: String,
    pub base_cost: Money,
    pub duration_months: u32,
    #[serde(default)]
    pub jobs: u32,
    #[serde(default)]
    pub min_mayor_rating: f32,
    #[serde(default)]
    pub kickbacks: Vec<KickbackOption>,
    #[serde(default)]
    pub effects: MetricEffects,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstructionProjectTemplate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub base_cost: Money,
    pub duration_months: u32,
    pub base_quality: f32,
    #[serde(default)]
    pub coverage_gain: f32,
    #[serde(default)]
    pub min_mayor_rating: f32,
    #[serde(default)]
    pub kickbacks: Vec<KickbackOption>,
    #[serde(default)]
    pub effects: MetricEffects,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityOperation {
    pub id: String,
    pub name: String,
    pub kind: OperationKind,
    pub cost: Money,
    pub base_success: f32,
    pub risk_reduction: f32,
    pub risk_on_failure: f32,
    #[serde(default = "default_suspicion_gain")]
    pub suspicion_on_failure: f32,
}

fn default_suspicion_gain() -> f32 {
    10.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpendingOption {
    pub id: String,
    pub name: String,
    pub kind: SpendingKind,
    pub cost: Money,
    /// Recurring options only.
    #[serde(default)]
    pub monthly_cost: Money,
    /// Investment options only; annual.
    #[serde(default)]
    pub appreciation_rate: f32,
    #[serde(default)]
    pub min_mayor_rating: f32,
    /// How conspicuous the purchase is; added to corruption risk.
    #[serde(default)]
    pub visibility: f32,
    #[serde(default)]
    pub effects: MetricEffects,
}

impl_template!(
    EmployeeTemplate,
    PolicyTemplate,
    TaxPolicyTemplate,
    Instrument,
    LoanOffer,
    DepositOffer,
    InvestmentTemplate,
    KickbackOption,
    IndustrialProjectTemplate,
    ConstructionProjectTemplate,
    SecurityOperation,
    SpendingOption,
    Agency,
    Threat,
    CitizenGroup,
    Issue,
);

impl Template for DepartmentTemplate {
    fn id(&self) -> &str {
        &self.id.0
    }
}

/// The full read-only catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub start: StartConditions,
    pub departments: Vec<DepartmentTemplate>,
    pub staff: Vec<EmployeeTemplate>,
    pub candidates: Vec<EmployeeTemplate>,
    pub policies: Vec<PolicyTemplate>,
    pub tax_policies: Vec<TaxPolicyTemplate>,
    pub instruments: Vec<Instrument>,
    pub loan_offers: Vec<LoanOffer>,
    pub deposit_offers: Vec<DepositOffer>,
    pub investments: Vec<InvestmentTemplate>,
    pub industrial_projects: Vec<IndustrialProjectTemplate>,
    pub construction_projects: Vec<ConstructionProjectTemplate>,
    pub security_operations: Vec<SecurityOperation>,
    pub agencies: Vec<Agency>,
    pub threats: Vec<Threat>,
    pub citizen_groups: Vec<CitizenGroup>,
    pub issues: Vec<Issue>,
    pub spending_options: Vec<SpendingOption>,
}

impl Catalog {
    /// Parse and validate a catalog from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    /// Load and validate a catalog file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_yaml_str(&text)?;
        info!(path = %path.as_ref().display(), policies = catalog.policies.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn department(&self, id: &str) -> Option<&DepartmentTemplate> {
        find(&self.departments, id)
    }
    pub fn candidate(&self, id: &str) -> Option<&EmployeeTemplate> {
        find(&self.candidates, id)
    }
    pub fn policy(&self, id: &str) -> Option<&PolicyTemplate> {
        find(&self.policies, id)
    }
    pub fn tax_policy(&self, id: &str) -> Option<&TaxPolicyTemplate> {
        find(&self.tax_policies, id)
    }
    pub fn instrument(&self, id: &str) -> Option<&Instrument> {
        find(&self.instruments, id)
    }
    pub fn loan_offer(&self, id: &str) -> Option<&LoanOffer> {
        find(&self.loan_offers, id)
    }
    pub fn deposit_offer(&self, id: &str) -> Option<&DepositOffer> {
        find(&self.deposit_offers, id)
    }
    pub fn investment(&self, id: &str) -> Option<&InvestmentTemplate> {
        find(&self.investments, id)
    }
    pub fn industrial_project(&self, id: &str) -> Option<&IndustrialProjectTemplate> {
        find(&self.industrial_projects, id)
    }
    pub fn construction_project(&self, id: &str) -> Option<&ConstructionProjectTemplate> {
        find(&self.construction_projects, id)
    }
    pub fn security_operation(&self, id: &str) -> Option<&SecurityOperation> {
        find(&self.security_operations, id)
    }
    pub fn spending_option(&self, id: &str) -> Option<&SpendingOption> {
        find(&self.spending_options, id)
    }
}

/// Resolve `ids` against `options`, failing on the first unknown id.
pub fn select_kickbacks<'a>(
    options: &'a [KickbackOption],
    ids: &[String],
) -> Result<Vec<&'a KickbackOption>, String> {
    ids.iter()
        .map(|id| find(options, id).ok_or_else(|| id.clone()))
        .collect()
}

fn unique_ids<T: Template>(kind: &'static str, items: &[T]) -> Result<(), CatalogError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: item.id().to_string(),
            });
        }
    }
    Ok(())
}

fn non_negative(kind: &'static str, id: &str, amount: Money) -> Result<(), CatalogError> {
    if amount < Decimal::ZERO {
        return Err(CatalogError::InvalidEntry {
            kind,
            id: id.to_string(),
            reason: format!("negative amount {amount}"),
        });
    }
    Ok(())
}

fn percentage(kind: &'static str, id: &str, value: f32) -> Result<(), CatalogError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CatalogError::InvalidEntry {
            kind,
            id: id.to_string(),
            reason: format!("{value} is not a percentage"),
        });
    }
    Ok(())
}

/// Validate ids, cross-references and numeric ranges.
pub fn validate_catalog(c: &Catalog) -> Result<(), CatalogError> {
    unique_ids("department", &c.departments)?;
    unique_ids("staff", &c.staff)?;
    unique_ids("candidate", &c.candidates)?;
    unique_ids("policy", &c.policies)?;
    unique_ids("tax policy", &c.tax_policies)?;
    unique_ids("instrument", &c.instruments)?;
    unique_ids("loan offer", &c.loan_offers)?;
    unique_ids("deposit offer", &c.deposit_offers)?;
    unique_ids("investment", &c.investments)?;
    unique_ids("industrial project", &c.industrial_projects)?;
    unique_ids("construction project", &c.construction_projects)?;
    unique_ids("security operation", &c.security_operations)?;
    unique_ids("agency", &c.agencies)?;
    unique_ids("threat", &c.threats)?;
    unique_ids("citizen group", &c.citizen_groups)?;
    unique_ids("issue", &c.issues)?;
    unique_ids("spending option", &c.spending_options)?;

    let departments: BTreeSet<&DepartmentId> = c.departments.iter().map(|d| &d.id).collect();
    for s in &c.staff {
        match &s.department {
            Some(d) if departments.contains(d) => {}
            Some(d) => {
                return Err(CatalogError::UnknownDepartment {
                    kind: "staff",
                    id: s.id.clone(),
                    department: d.0.clone(),
                })
            }
            None => {
                return Err(CatalogError::InvalidEntry {
                    kind: "staff",
                    id: s.id.clone(),
                    reason: "initial staff needs a department".to_string(),
                })
            }
        }
    }
    for p in &c.policies {
        non_negative("policy", &p.id, p.cost)?;
        if let Some(d) = &p.department {
            if !departments.contains(d) {
                return Err(CatalogError::UnknownDepartment {
                    kind: "policy",
                    id: p.id.clone(),
                    department: d.0.clone(),
                });
            }
        }
    }
    for p in &c.tax_policies {
        non_negative("tax policy", &p.id, p.cost)?;
    }
    for o in &c.loan_offers {
        if o.amount <= Decimal::ZERO || o.term_months == 0 {
            return Err(CatalogError::InvalidEntry {
                kind: "loan offer",
                id: o.id.clone(),
                reason: "amount and term must be positive".to_string(),
            });
        }
    }
    for o in &c.deposit_offers {
        if o.min_amount > o.max_amount || o.min_amount < Decimal::ZERO {
            return Err(CatalogError::InvalidEntry {
                kind: "deposit offer",
                id: o.id.clone(),
                reason: "min_amount must be within [0, max_amount]".to_string(),
            });
        }
    }
    for t in &c.investments {
        non_negative("investment", &t.id, t.cost)?;
        if let Some(pct) = t.personal_kickback_pct {
            percentage("investment", &t.id, pct)?;
        }
    }
    for p in &c.industrial_projects {
        non_negative("industrial project", &p.id, p.base_cost)?;
        unique_ids("kickback", &p.kickbacks)?;
        for k in &p.kickbacks {
            non_negative("kickback", &k.id, k.amount)?;
        }
    }
    for p in &c.construction_projects {
        non_negative("construction project", &p.id, p.base_cost)?;
        percentage("construction project", &p.id, p.base_quality)?;
        unique_ids("kickback", &p.kickbacks)?;
        for k in &p.kickbacks {
            non_negative("kickback", &k.id, k.amount)?;
        }
    }
    for o in &c.security_operations {
        non_negative("security operation", &o.id, o.cost)?;
        percentage("security operation", &o.id, o.base_success)?;
    }
    for t in &c.threats {
        for m in &t.mitigation_options {
            non_negative("mitigation", &m.id, m.cost)?;
            percentage("mitigation", &m.id, m.success_rate)?;
        }
    }
    for o in &c.spending_options {
        non_negative("spending option", &o.id, o.cost)?;
        non_negative("spending option", &o.id, o.monthly_cost)?;
    }
    Ok(())
}
