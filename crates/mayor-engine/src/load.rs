//! Reconciling a saved state with the current state shape.
//!
//! Saves are merged subsystem by subsystem over a freshly built default: a
//! top-level object in the save replaces the default's fields one by one, so
//! a save written before a field or a whole subsystem existed still loads
//! into a complete state. Derived projections are always regenerated.

use crate::init::seed_issues;
use crate::recompute::recompute;
use mayor_catalog::Catalog;
use mayor_core::{validate_state, Account, AccountType, GameState, ValidationError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("saved state must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("saved state has the wrong shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("saved state is inconsistent: {0}")]
    Invalid(#[from] ValidationError),
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn overlay(base: &mut Map<String, Value>, saved: &Map<String, Value>) {
    for (key, value) in saved {
        match (base.get_mut(key), value) {
            (Some(Value::Object(inner)), Value::Object(fields)) => {
                for (field, v) in fields {
                    inner.insert(field.clone(), v.clone());
                }
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge `saved` over `default`.
///
/// Every account exists afterwards, derived metrics are recomputed and an
/// empty issue desk is reseeded from the catalog. Merging a state that came
/// out of this function again yields the same state.
pub fn merge(default: &GameState, saved: &Value, catalog: &Catalog) -> Result<GameState, LoadError> {
    let Value::Object(saved_fields) = saved else {
        return Err(LoadError::NotAnObject(type_name(saved)));
    };
    let mut base = match serde_json::to_value(default)? {
        Value::Object(map) => map,
        other => return Err(LoadError::NotAnObject(type_name(&other))),
    };
    overlay(&mut base, saved_fields);

    let mut state: GameState = serde_json::from_value(Value::Object(base))?;
    for account in AccountType::ALL {
        state.banking.accounts.entry(account).or_insert_with(Account::default);
    }
    seed_issues(&mut state, catalog);
    recompute(&mut state);
    validate_state(&state)?;
    info!(
        subsystems = saved_fields.len(),
        issues = state.citizens.active_issues.len(),
        "saved state merged"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn missing_subsystems_come_from_the_default() {
        let (catalog, default) = game();
        let saved = json!({ "mayor_rating": 70.0, "banking": { "missed_payments": 2 } });
        let s = merge(&default, &saved, &catalog).unwrap();
        assert_eq!(s.mayor_rating, 70.0);
        assert_eq!(s.banking.missed_payments, 2);
        assert_eq!(s.banking.accounts, default.banking.accounts);
        assert_eq!(s.government, default.government);
        assert_eq!(s.citizens.active_issues.len(), 3);
    }

    #[test]
    fn missing_accounts_are_opened() {
        let (catalog, default) = game();
        let saved = json!({ "banking": { "accounts": { "city_checking": { "balance": "1000" } } } });
        let s = merge(&default, &saved, &catalog).unwrap();
        assert_eq!(s.banking.accounts.len(), AccountType::ALL.len());
        assert_eq!(s.balance(AccountType::CityChecking), money(1000));
        assert_eq!(s.balance(AccountType::Offshore), money(0));
        assert_eq!(s.budget, money(1000));
    }

    #[test]
    fn projection_is_regenerated() {
        let (catalog, default) = game();
        let saved = json!({ "finance": { "personal_finances": { "total_wealth": "999999999" } } });
        let s = merge(&default, &saved, &catalog).unwrap();
        assert_eq!(s.finance, default.finance);
    }

    #[test]
    fn empty_issue_desk_is_reseeded() {
        let (catalog, default) = game();
        let saved = json!({ "citizens": { "active_issues": [] } });
        let s = merge(&default, &saved, &catalog).unwrap();
        assert_eq!(s.citizens.active_issues, default.citizens.active_issues);
    }

    #[test]
    fn bad_shapes_are_errors() {
        let (catalog, default) = game();
        assert!(matches!(
            merge(&default, &json!([1, 2]), &catalog),
            Err(LoadError::NotAnObject("an array"))
        ));
        assert!(matches!(
            merge(&default, &json!({ "mayor_rating": "high" }), &catalog),
            Err(LoadError::Shape(_))
        ));
        let negative = json!({ "banking": { "accounts": { "offshore": { "balance": "-5" } } } });
        assert!(matches!(merge(&default, &negative, &catalog), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn merge_is_idempotent_on_a_played_state() {
        let (catalog, default) = game();
        let mut played = default.clone();
        played.citizens.active_issues.remove(0);
        played.next_entity_id = 7;
        let once = merge(&default, &serde_json::to_value(&played).unwrap(), &catalog).unwrap();
        let twice = merge(&default, &serde_json::to_value(&once).unwrap(), &catalog).unwrap();
        assert_eq!(once, twice);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]
        #[test]
        fn merge_is_idempotent(
            rating in 0.0f32..100.0,
            happiness in proptest::option::of(0.0f32..100.0),
            offshore in 0i64..50_000_000,
            paused in any::<bool>(),
            drop_issues in any::<bool>(),
        ) {
            let (catalog, default) = game();
            let mut saved = json!({
                "mayor_rating": rating,
                "paused": paused,
                "banking": { "accounts": { "offshore": { "balance": offshore.to_string() } } },
            });
            if let Some(h) = happiness {
                saved["happiness"] = json!(h);
            }
            if drop_issues {
                saved["citizens"] = json!({ "active_issues": [] });
            }
            let once = merge(&default, &saved, &catalog).unwrap();
            let twice = merge(&default, &serde_json::to_value(&once).unwrap(), &catalog).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
