//! City construction projects.

use super::industry::{checked_kickbacks, pay_with_kickbacks};
use super::{apply_effects, HandlerResult};
use crate::command::StartProject;
use crate::error::CommandError;
use mayor_catalog::Catalog;
use mayor_core::{clamp_metric, ActiveConstruction, GameState};
use mayor_econ::construction::{blended_infrastructure_quality, can_start_construction, construction_quality};

/// Start a construction project. Kickbacks are paid on top of the base cost,
/// land offshore and lower the build quality.
pub fn start_construction(state: &GameState, cmd: &StartProject, catalog: &Catalog) -> HandlerResult {
    let template = catalog
        .construction_project(&cmd.project_id)
        .ok_or_else(|| CommandError::not_found("construction project", &cmd.project_id))?;
    let checks = can_start_construction(template, &cmd.kickback_ids, state);
    let (kickbacks, total) =
        checked_kickbacks(checks, &template.kickbacks, &cmd.kickback_ids, template.base_cost, state)?;
    let quality = construction_quality(template.base_quality, &kickbacks);

    let mut next = state.clone();
    let skim = pay_with_kickbacks(&mut next, total, &kickbacks)?;
    let id = next.allocate_id("construction");
    let construction = &mut next.construction;
    construction.active_projects.push(ActiveConstruction {
        id,
        template_id: template.id.clone(),
        name: template.name.clone(),
        category: template.category.clone(),
        base_cost: template.base_cost,
        kickback_total: skim,
        kickback_ids: cmd.kickback_ids.clone(),
        quality,
        progress: 0.0,
        remaining_months: template.duration_months,
        started_on: state.date,
    });
    construction.total_spent = construction.total_spent.saturating_add(total);
    construction.infrastructure_quality = blended_infrastructure_quality(construction.infrastructure_quality, quality);
    construction.coverage = clamp_metric(construction.coverage + template.coverage_gain);
    apply_effects(&mut next, &template.effects, None);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::*;
    use mayor_core::AccountType;

    #[test]
    fn clean_build_keeps_base_quality() {
        let (catalog, s) = game();
        let cmd = StartProject {
            project_id: "school_campus".into(),
            kickback_ids: Vec::new(),
        };
        let next = start_construction(&s, &cmd, &catalog).unwrap();
        let p = &next.construction.active_projects[0];
        assert_eq!(p.quality, 75.0);
        assert_eq!(p.progress, 0.0);
        assert_eq!(p.remaining_months, 18);
        assert_eq!(
            s.balance(AccountType::CityChecking) - next.balance(AccountType::CityChecking),
            money(14_000_000)
        );
        assert!(untouched_except(&s, &next, &[AccountType::CityChecking]));
        assert_eq!(next.construction.coverage, s.construction.coverage + 5.0);
    }

    #[test]
    fn kickbacks_cost_quality_and_go_offshore() {
        let (catalog, s) = game();
        let cmd = StartProject {
            project_id: "ring_road".into(),
            kickback_ids: vec!["ring_asphalt".into(), "ring_subcontract".into()],
        };
        let next = start_construction(&s, &cmd, &catalog).unwrap();
        let p = &next.construction.active_projects[0];
        assert_eq!(p.quality, 60.0);
        assert_eq!(p.kickback_total, money(4_000_000));
        assert_eq!(
            s.balance(AccountType::CityChecking) - next.balance(AccountType::CityChecking),
            money(34_000_000)
        );
        assert_eq!(next.balance(AccountType::Offshore), money(4_000_000));
        assert_eq!(next.construction.total_spent, money(34_000_000));
        // 50 + (60 - 50) * 0.2
        assert!((next.construction.infrastructure_quality - 52.0).abs() < 1e-4);
        assert_eq!(next.government.corruption_risk, s.government.corruption_risk + 17.0);
    }

    #[test]
    fn repeated_kickback_is_rejected() {
        let (catalog, s) = game();
        let cmd = StartProject {
            project_id: "ring_road".into(),
            kickback_ids: vec!["ring_asphalt".into(); 3],
        };
        assert_eq!(
            start_construction(&s, &cmd, &catalog).unwrap_err(),
            CommandError::invalid("kickback option ring_asphalt selected more than once")
        );
    }

    #[test]
    fn short_city_funds_are_reported_as_such() {
        let (catalog, mut s) = game();
        set_balance(&mut s, AccountType::CityChecking, 31_000_000);
        let cmd = StartProject {
            project_id: "ring_road".into(),
            kickback_ids: vec!["ring_asphalt".into()],
        };
        assert!(matches!(
            start_construction(&s, &cmd, &catalog),
            Err(CommandError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn unknown_project_is_not_found() {
        let (catalog, s) = game();
        let cmd = StartProject {
            project_id: "space_elevator".into(),
            kickback_ids: Vec::new(),
        };
        assert!(matches!(
            start_construction(&s, &cmd, &catalog),
            Err(CommandError::NotFound { .. })
        ));
    }
}
