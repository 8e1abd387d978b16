//! Steering: forces, turn-rate limiting, speed easing and wall collisions.

use super::hover;
use super::lifecycle::base_speed;
use crate::config::AppConfig;
use crate::geometry::{
    clamp01, clamp_angle_for_facing, direction, move_towards_angle, normalize_angle,
    resolve_facing_by_cos, Rect,
};
use crate::rng::{chance, range, range_of};
use crate::snapshot::FishContext;
use aquarium_data::{Behavior, Bounds, Fish, Vec2};
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

/// Side effects of one steering step the world has to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutcome {
    /// Midpoint of a mating pair that just reached the bubble moment.
    pub bubble_burst: Option<Vec2>,
}

/// Rectangle the fish centre may occupy given its current size.
#[must_use]
pub fn movement_bounds(fish: &Fish, bounds: Bounds) -> Rect {
    let margin = fish.size * 0.62;
    let height = bounds.swim_height();
    Rect {
        min_x: margin,
        max_x: margin.max(bounds.width - margin),
        min_y: margin,
        max_y: margin.max(height - (fish.size * 0.18).max(2.0)),
    }
}

/// Fresh wander target. Bottom dwellers scan along the substrate instead.
pub fn pick_target<R: Rng + ?Sized>(
    fish: &Fish,
    bounds: Bounds,
    config: &AppConfig,
    rng: &mut R,
) -> Vec2 {
    let w = bounds.width;
    let h = bounds.swim_height();
    let inset = (w.min(h) * 0.04).clamp(8.0, 18.0);
    let max_x = inset.max(w - inset);
    let max_y = inset.max(h - inset);

    let species = config.species.get(fish.species_id);
    if let Some(dweller) = &species.bottom_dweller {
        let step = range_of(rng, dweller.scan_step_x_px);
        let sign = if chance(rng, 0.5) { 1.0 } else { -1.0 };
        let mut x = fish.position.x + sign * step;
        if x < inset || x > max_x {
            x = fish.position.x - sign * step;
        }
        let y = if chance(rng, dweller.probe_chance) {
            movement_bounds(fish, bounds).max_y - range_of(rng, dweller.probe_depth_px)
        } else {
            range(rng, dweller.band_start01 * h, dweller.band_end01 * h)
                + range(rng, -dweller.scan_jitter_y_px, dweller.scan_jitter_y_px)
        };
        return Vec2::new(x.clamp(inset, max_x), y.clamp(inset, max_y));
    }

    Vec2::new(range(rng, inset, max_x), range(rng, inset, max_y))
}

fn wall_avoidance(fish: &Fish, bounds: Bounds, config: &AppConfig) -> Vec2 {
    let f = &config.fish;
    let influence = (bounds.width.min(bounds.swim_height()) * f.wall_influence_ratio)
        .clamp(f.wall_influence_range[0], f.wall_influence_range[1]);
    let mb = movement_bounds(fish, bounds);
    let push = |d: f64| {
        if d < influence {
            let t = (influence - d.max(0.0)) / influence;
            t * t * f.wall_strength
        } else {
            0.0
        }
    };
    let p = fish.position;
    Vec2::new(
        push(p.x - mb.min_x) - push(mb.max_x - p.x),
        push(p.y - mb.min_y) - push(mb.max_y - p.y),
    )
}

fn schooling_force<R: Rng + ?Sized>(fish: &mut Fish, ctx: &FishContext<'_>, rng: &mut R) -> Vec2 {
    let profile = &ctx.config.species.get(fish.species_id).schooling;
    if !profile.enabled {
        return Vec2::default();
    }
    let now = ctx.now_sec;
    if now >= fish.schooling.next_solo_at_sec && now >= fish.schooling.solo_until_sec {
        fish.schooling.solo_until_sec = now + range_of(rng, profile.solo_window_sec);
        fish.schooling.next_solo_at_sec =
            fish.schooling.solo_until_sec + range_of(rng, profile.solo_cooldown_sec);
    }
    if now < fish.schooling.solo_until_sec {
        return Vec2::default();
    }

    let mut centroid = Vec2::default();
    let mut align = Vec2::default();
    let mut separate = Vec2::default();
    let mut count = 0.0;
    for other in ctx.fish {
        if other.id == fish.id || !other.alive || other.species_id != fish.species_id {
            continue;
        }
        let d = fish.position.distance_to(other.position);
        if d > profile.neighbor_radius {
            continue;
        }
        count += 1.0;
        centroid.x += other.position.x;
        centroid.y += other.position.y;
        align.x += other.heading_angle.cos();
        align.y += other.heading_angle.sin();
        if d < profile.separation_radius && d > f64::EPSILON {
            let away = direction(other.position, fish.position);
            let weight = 1.0 - d / profile.separation_radius;
            separate.x += away.x * weight;
            separate.y += away.y * weight;
        }
    }
    if count == 0.0 {
        return Vec2::default();
    }
    centroid = Vec2::new(centroid.x / count, centroid.y / count);
    let cohesion = direction(fish.position, centroid);
    let align_len = align.length().max(f64::EPSILON);

    let bias = fish.schooling.bias;
    let mut force = Vec2::new(
        (cohesion.x * profile.cohesion
            + align.x / align_len * profile.alignment
            + separate.x * profile.separation)
            * bias,
        (cohesion.y * profile.cohesion
            + align.y / align_len * profile.alignment
            + separate.y * profile.separation)
            * bias,
    );
    let magnitude = force.length();
    if magnitude > profile.max_influence {
        let scale = profile.max_influence / magnitude;
        force = Vec2::new(force.x * scale, force.y * scale);
    }
    force
}

fn bottom_band_force(fish: &Fish, ctx: &FishContext<'_>) -> Vec2 {
    let Some(dweller) = &ctx.config.species.get(fish.species_id).bottom_dweller else {
        return Vec2::default();
    };
    let h = ctx.bounds.swim_height();
    let band_start = dweller.band_start01 * h;
    let band_end = dweller.band_end01 * h;
    let y = fish.position.y;
    let pull = if y < band_start {
        clamp01((band_start - y) / band_start.max(1.0))
    } else if y > band_end {
        -clamp01((y - band_end) / (h - band_end).max(1.0))
    } else {
        0.0
    };
    Vec2::new(0.0, pull * dweller.steer_bias_strength)
}

/// Re-reads the live position of whatever the current behaviour chases.
fn resolve_target(fish: &mut Fish, dt: f64, ctx: &FishContext<'_>) {
    match &fish.behavior {
        Behavior::SeekFood { target, .. } => {
            if let Some(pos) = ctx.edible_position(*target) {
                fish.target = pos;
            }
        }
        Behavior::PlayChase {
            target_fish_id: Some(id),
            ..
        } => {
            if let Some(runner) = ctx.fish_by_id(*id) {
                let lead = runner.current_speed * ctx.config.fish.chase_lookahead_sec.min(dt * 4.0);
                fish.target = Vec2::new(
                    runner.position.x + runner.heading_angle.cos() * lead,
                    runner.position.y + runner.heading_angle.sin() * lead,
                );
            }
        }
        Behavior::PlayEvade {
            target_fish_id: Some(id),
            ..
        } => {
            if let Some(hunter) = ctx.fish_by_id(*id) {
                let away = direction(hunter.position, fish.position);
                let d = ctx.config.fish.evade_distance;
                fish.target = movement_bounds(fish, ctx.bounds).clamp(Vec2::new(
                    fish.position.x + away.x * d,
                    fish.position.y + away.y * d,
                ));
            }
        }
        Behavior::SeekLayTarget => {
            if let Some(lay) = fish.repro.lay_target {
                fish.target = lay;
            }
        }
        _ => {}
    }
}

/// Lateral wiggle while mating. Returns the wiggle velocity and, once per
/// animation, the bubble point.
fn mating_wiggle(fish: &mut Fish, base: f64, ctx: &FishContext<'_>) -> (Vec2, Option<Vec2>) {
    let Some(mut anim) = fish.mating_anim else {
        return (Vec2::default(), None);
    };
    let f = &ctx.config.fish;
    let p = clamp01((ctx.now_sec - anim.start_sec) / anim.duration_sec.max(0.001));
    let partner = ctx.fish_by_id(anim.partner_id).filter(|o| o.alive);
    let Some(partner) = partner else {
        fish.mating_anim = None;
        return (Vec2::default(), None);
    };
    if p >= 1.0 {
        fish.mating_anim = None;
        return (Vec2::default(), None);
    }

    let amplitude = (f.mating_wiggle_px * (p * PI).sin() * 0.8).min((base * 0.15).max(0.0001));
    let side = if fish.is_female() { 1.0 } else { -1.0 };
    let tangent = Vec2::new(
        -fish.heading_angle.sin() * amplitude * side,
        fish.heading_angle.cos() * amplitude * side,
    );

    let mut burst = None;
    if p >= f.mating_bubble_progress && !anim.bubble_burst_done {
        anim.bubble_burst_done = true;
        burst = Some(fish.position.midpoint(partner.position));
    }
    fish.mating_anim = Some(anim);
    (tangent, burst)
}

fn resolve_collisions<R: Rng + ?Sized>(
    fish: &mut Fish,
    base: f64,
    bounds: Bounds,
    config: &AppConfig,
    rng: &mut R,
) {
    let mb = movement_bounds(fish, bounds);
    let hit_x = fish.position.x < mb.min_x || fish.position.x > mb.max_x;
    let hit_y = fish.position.y < mb.min_y || fish.position.y > mb.max_y;
    fish.position = mb.clamp(fish.position);
    if !hit_x && !hit_y {
        return;
    }
    if hit_x {
        fish.heading_angle = normalize_angle(PI - fish.heading_angle);
    }
    if hit_y {
        fish.heading_angle = normalize_angle(-fish.heading_angle);
    }
    let f = &config.fish;
    fish.facing = resolve_facing_by_cos(fish.heading_angle, fish.facing, f.face_switch_cos);
    fish.heading_angle = clamp_angle_for_facing(fish.heading_angle, fish.facing, f.max_tilt_rad);
    fish.desired_angle = fish.heading_angle;
    fish.target = pick_target(fish, bounds, config, rng);
    fish.current_speed = fish.current_speed.max(base * 0.95);
}

fn sink(fish: &mut Fish, dt: f64, bounds: Bounds, config: &AppConfig) {
    let mb = movement_bounds(fish, bounds);
    fish.current_speed = 0.0;
    fish.heading_angle = FRAC_PI_2;
    fish.desired_angle = FRAC_PI_2;
    fish.position.y = mb.max_y.min(fish.position.y + config.fish.dead_sink_speed * dt);
    fish.position.x = fish.position.x.clamp(mb.min_x, mb.max_x);
    fish.last_distance_moved = 0.0;
}

/// One steering and integration step.
pub fn apply_steering<R: Rng + ?Sized>(
    fish: &mut Fish,
    dt: f64,
    ctx: &FishContext<'_>,
    rng: &mut R,
) -> SteeringOutcome {
    let config = ctx.config;
    if dt <= 0.0 {
        return SteeringOutcome::default();
    }
    if !fish.is_alive() || fish.behavior == Behavior::DeadSink {
        sink(fish, dt, ctx.bounds, config);
        return SteeringOutcome::default();
    }

    let f = &config.fish;
    let species = config.species.get(fish.species_id);
    let base = base_speed(fish, config);
    let now = ctx.now_sec;

    resolve_target(fish, dt, ctx);

    if fish.hover.anchor.is_some() && hover::has_urgent_goal(fish) {
        hover::cancel(fish, now, config, rng);
    }
    let hovering = hover::refresh(fish, now, config, rng);
    if hovering {
        if let Some(pos) = hover::desired_position(fish, ctx) {
            fish.target = pos;
        }
    } else if fish.behavior == Behavior::Wander {
        let reached = fish.position.distance_to(fish.target) <= f.target_reached_radius;
        if reached || chance(rng, f.retarget_chance) {
            fish.target = pick_target(fish, ctx.bounds, config, rng);
        }
    }

    let mut force = direction(fish.position, fish.target);
    if matches!(fish.behavior, Behavior::SeekFood { .. }) {
        force = Vec2::new(force.x * f.seek_force_multiplier, force.y * f.seek_force_multiplier);
    }
    let wall = wall_avoidance(fish, ctx.bounds, config);
    force.x += wall.x;
    force.y += wall.y;
    if fish.behavior == Behavior::Wander && !hovering {
        let school = schooling_force(fish, ctx, rng);
        let band = bottom_band_force(fish, ctx);
        force.x += school.x + band.x;
        force.y += school.y + band.y;
    }

    let (wiggle, bubble_burst) = mating_wiggle(fish, base, ctx);

    let raw = if force.length() > f64::EPSILON {
        force.y.atan2(force.x)
    } else {
        fish.heading_angle
    };
    fish.facing = resolve_facing_by_cos(raw, fish.facing, f.face_switch_cos);
    let constrained = clamp_angle_for_facing(raw, fish.facing, f.max_tilt_rad);
    let turn_scale = if hovering {
        config.hover.turn_rate_multiplier
    } else {
        1.0
    };
    fish.desired_angle = move_towards_angle(
        fish.desired_angle,
        constrained,
        f.desired_turn_rate * dt * turn_scale * species.desired_turn_rate_scale,
    );
    fish.heading_angle = move_towards_angle(
        fish.heading_angle,
        fish.desired_angle,
        f.max_turn_rate * dt * turn_scale * species.turn_rate_scale,
    );

    fish.cruise_phase = normalize_angle(fish.cruise_phase + dt * fish.cruise_rate);
    let cruise = 1.0 + f.cruise_amplitude * fish.cruise_phase.sin();
    let mut desired_speed = base * cruise * fish.behavior.speed_boost();
    let response = if hovering {
        desired_speed *= config.hover.speed_factor;
        (config.hover.speed_response * dt).min(1.0)
    } else {
        (f.speed_response * dt).min(1.0)
    };
    fish.current_speed += (desired_speed - fish.current_speed) * response;
    if hovering {
        fish.current_speed = fish.current_speed.min(base * config.hover.speed_factor);
    }

    let previous = fish.position;
    fish.position.x += (fish.heading_angle.cos() * fish.current_speed + wiggle.x) * dt;
    fish.position.y += (fish.heading_angle.sin() * fish.current_speed + wiggle.y) * dt;
    resolve_collisions(fish, base, ctx.bounds, config, rng);
    fish.last_distance_moved = previous.distance_to(fish.position);

    SteeringOutcome { bubble_burst }
}
