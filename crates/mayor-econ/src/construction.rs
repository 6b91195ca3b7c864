//! Construction-project resolvers.

use crate::industry::{project_checks, ProjectChecks};
use mayor_catalog::{ConstructionProjectTemplate, KickbackOption};
use mayor_core::{clamp_metric, GameState};

/// Eligibility of a construction project with the chosen kickbacks.
pub fn can_start_construction(
    template: &ConstructionProjectTemplate,
    kickback_ids: &[String],
    state: &GameState,
) -> ProjectChecks {
    project_checks(
        &template.name,
        template.base_cost,
        template.min_mayor_rating,
        &template.kickbacks,
        kickback_ids,
        state,
    )
}

/// Build quality once every selected kickback has taken its cut.
pub fn construction_quality(base_quality: f32, kickbacks: &[&KickbackOption]) -> f32 {
    let penalty: f32 = kickbacks.iter().map(|k| k.quality_penalty).sum();
    clamp_metric(base_quality - penalty)
}

/// City-wide infrastructure quality after adding a project of `quality`.
///
/// A running blend: every new project pulls the average a fifth of the way
/// toward its own quality.
pub fn blended_infrastructure_quality(current: f32, quality: f32) -> f32 {
    clamp_metric(current + (quality - current) * 0.2)
}
