//! Housekeeping: error clearing, pause and speed.

use super::HandlerResult;
use crate::command::{SetPaused, SetSpeed};
use crate::error::CommandError;
use mayor_core::GameState;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 5;

pub fn clear_error(state: &GameState) -> HandlerResult {
    let mut next = state.clone();
    next.error_message = None;
    Ok(next)
}

pub fn set_paused(state: &GameState, cmd: &SetPaused) -> HandlerResult {
    let mut next = state.clone();
    next.paused = cmd.paused;
    Ok(next)
}

pub fn set_speed(state: &GameState, cmd: &SetSpeed) -> HandlerResult {
    if !(MIN_SPEED..=MAX_SPEED).contains(&cmd.speed) {
        return Err(CommandError::invalid(format!(
            "speed {} is outside {MIN_SPEED}..={MAX_SPEED}",
            cmd.speed
        )));
    }
    let mut next = state.clone();
    next.speed = cmd.speed;
    Ok(next)
}
