//! Hover: a brief idle linger around an anchor point.

use super::steering::movement_bounds;
use crate::config::AppConfig;
use crate::geometry::Rect;
use crate::rng::{chance, range, range_of};
use crate::snapshot::FishContext;
use aquarium_data::{Behavior, Fish, HungerState, ReproPhase, Vec2};
use rand::Rng;

/// Region a hovering fish must stay inside.
#[must_use]
pub fn safe_bounds(fish: &Fish, ctx: &FishContext<'_>) -> Rect {
    movement_bounds(fish, ctx.bounds).inset(ctx.config.hover.wall_margin_px)
}

#[must_use]
pub fn is_hovering(fish: &Fish, now_sec: f64) -> bool {
    fish.hover.anchor.is_some() && now_sec < fish.hover.until_sec
}

fn is_eligible(fish: &Fish, ctx: &FishContext<'_>) -> bool {
    fish.is_alive()
        && fish.eat_anim_timer <= 0.0
        && fish.behavior == Behavior::Wander
        && fish.hunger_state == HungerState::Fed
        && fish.play_state.session_id.is_none()
        && !matches!(fish.repro.state, ReproPhase::Gravid | ReproPhase::Laying)
        && fish.mating_anim.is_none()
        && safe_bounds(fish, ctx).contains(fish.position)
}

/// Goals that must interrupt an idle hover.
#[must_use]
pub fn has_urgent_goal(fish: &Fish) -> bool {
    !fish.is_alive()
        || fish.eat_anim_timer > 0.0
        || matches!(fish.behavior, Behavior::SeekFood { .. })
        || fish.behavior.is_playing()
        || fish.play_state.session_id.is_some()
        || matches!(fish.repro.state, ReproPhase::Gravid | ReproPhase::Laying)
        || fish.mating_anim.is_some()
}

/// Ends any hover and pushes the next attempt into the cooldown window.
pub fn cancel<R: Rng + ?Sized>(fish: &mut Fish, now_sec: f64, config: &AppConfig, rng: &mut R) {
    fish.hover.until_sec = 0.0;
    fish.hover.anchor = None;
    fish.hover.offset = None;
    fish.hover.next_eligible_at_sec = now_sec + range_of(rng, config.hover.cooldown_sec);
}

/// `true` while a hover runs; an expired hover is cancelled here.
pub fn refresh<R: Rng + ?Sized>(
    fish: &mut Fish,
    now_sec: f64,
    config: &AppConfig,
    rng: &mut R,
) -> bool {
    if fish.hover.anchor.is_none() {
        return false;
    }
    if now_sec < fish.hover.until_sec {
        return true;
    }
    cancel(fish, now_sec, config, rng);
    false
}

fn try_schedule<R: Rng + ?Sized>(fish: &mut Fish, ctx: &FishContext<'_>, rng: &mut R) {
    let now = ctx.now_sec;
    if fish.hover.anchor.is_some() || now < fish.hover.next_eligible_at_sec {
        return;
    }
    if !is_eligible(fish, ctx) {
        return;
    }
    let h = &ctx.config.hover;
    if !chance(rng, h.chance_per_check) {
        fish.hover.next_eligible_at_sec = now + range_of(rng, h.retry_sec);
        return;
    }
    fish.hover.until_sec = now + range_of(rng, h.duration_sec);
    fish.hover.anchor = Some(fish.position);
    let angle = range(rng, 0.0, std::f64::consts::TAU);
    let radius = range_of(rng, h.offset_px);
    fish.hover.offset = Some(Vec2::new(angle.cos() * radius, angle.sin() * radius));
}

/// Runs after each behaviour decision: cancel on urgency, else maybe start.
pub fn update_after_behavior<R: Rng + ?Sized>(
    fish: &mut Fish,
    ctx: &FishContext<'_>,
    rng: &mut R,
) {
    if fish.hover.anchor.is_some() && has_urgent_goal(fish) {
        cancel(fish, ctx.now_sec, ctx.config, rng);
        return;
    }
    if refresh(fish, ctx.now_sec, ctx.config, rng) {
        return;
    }
    try_schedule(fish, ctx, rng);
}

/// Point the fish drifts towards while hovering.
#[must_use]
pub fn desired_position(fish: &Fish, ctx: &FishContext<'_>) -> Option<Vec2> {
    let anchor = fish.hover.anchor?;
    let offset = fish.hover.offset.unwrap_or_default();
    Some(safe_bounds(fish, ctx).clamp(Vec2::new(anchor.x + offset.x, anchor.y + offset.y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::test_fish;
    use crate::rng::FixedRng;
    use aquarium_data::Bounds;

    fn ctx(config: &AppConfig, now_sec: f64) -> FishContext<'_> {
        FishContext {
            config,
            bounds: Bounds::new(800.0, 600.0),
            now_sec,
            hygiene01: 1.0,
            fish: &[],
            food: &[],
            poop: &[],
            eggs: &[],
            fruits: &[],
        }
    }

    #[test]
    fn test_successful_roll_starts_hover() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.position = Vec2::new(400.0, 300.0);
        fish.hunger_state = HungerState::Fed;
        let mut rng = FixedRng::new(0.0);
        update_after_behavior(&mut fish, &ctx(&config, 10.0), &mut rng);
        assert!(is_hovering(&fish, 10.0));
        assert!((fish.hover.until_sec - 10.6).abs() < 1e-9);
        assert_eq!(fish.hover.anchor, Some(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_failed_roll_schedules_retry() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.position = Vec2::new(400.0, 300.0);
        fish.hunger_state = HungerState::Fed;
        let mut rng = FixedRng::new(0.5);
        update_after_behavior(&mut fish, &ctx(&config, 10.0), &mut rng);
        assert!(!is_hovering(&fish, 10.0));
        assert_eq!(fish.hover.next_eligible_at_sec, 15.5);
    }

    #[test]
    fn test_urgent_goal_cancels_hover() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.hover.anchor = Some(Vec2::new(1.0, 1.0));
        fish.hover.until_sec = 100.0;
        fish.eat_anim_timer = 0.1;
        let mut rng = FixedRng::new(0.0);
        update_after_behavior(&mut fish, &ctx(&config, 10.0), &mut rng);
        assert!(!is_hovering(&fish, 10.0));
        assert_eq!(fish.hover.next_eligible_at_sec, 16.0);
    }

    #[test]
    fn test_near_wall_is_ineligible() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.position = Vec2::new(5.0, 300.0);
        fish.hunger_state = HungerState::Fed;
        let mut rng = FixedRng::new(0.0);
        update_after_behavior(&mut fish, &ctx(&config, 10.0), &mut rng);
        assert!(!is_hovering(&fish, 10.0));
    }
}
