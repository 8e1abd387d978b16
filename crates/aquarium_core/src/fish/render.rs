//! Read-only queries a renderer or inspector needs.

use crate::config::{AppConfig, Morph};
use crate::geometry::{clamp01, lerp, normalize_angle};
use aquarium_data::{Fish, LifeStage, ReproPhase, Vec2};
use serde::Serialize;
use std::f64::consts::PI;

/// Body tilt relative to the facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadingPose {
    pub tilt: f64,
    pub facing: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub radius: f64,
    pub body_length: f64,
    pub body_height: f64,
    pub tail_wag_amp: f64,
    pub eye_scale: f64,
    pub saturation_mult: f64,
    pub lightness_mult: f64,
    pub condition01: f64,
}

fn morph_for(stage: LifeStage, config: &AppConfig) -> Morph {
    let table = &config.fish.morph;
    match stage {
        LifeStage::Baby => table.baby,
        LifeStage::Juvenile => table.juvenile,
        LifeStage::Adult => table.adult,
        LifeStage::Old => table.old,
    }
}

#[must_use]
pub fn heading(fish: &Fish, config: &AppConfig) -> HeadingPose {
    let base = if fish.facing == -1 { PI } else { 0.0 };
    let max_tilt = config.fish.max_tilt_rad;
    let tilt = normalize_angle(fish.heading_angle - base).clamp(-max_tilt, max_tilt);
    HeadingPose {
        tilt,
        facing: fish.facing,
    }
}

#[must_use]
pub fn render_params(fish: &Fish, config: &AppConfig) -> RenderParams {
    let m = morph_for(fish.life_stage, config);
    let condition = clamp01(1.0 - 0.9 * fish.hunger01);
    RenderParams {
        radius: fish.size,
        body_length: fish.size * 1.32 * m.body_length,
        body_height: fish.size * 0.73 * m.body_height * lerp(0.92, 1.06, condition),
        tail_wag_amp: fish.size * 0.13 * m.tail_length,
        eye_scale: m.eye * lerp(0.95, 1.05, condition),
        saturation_mult: m.saturation * lerp(0.92, 1.06, condition),
        lightness_mult: m.lightness,
        condition01: condition,
    }
}

#[must_use]
pub fn mouth_open01(fish: &Fish) -> f64 {
    if fish.eat_anim_timer <= 0.0 || fish.eat_anim_duration <= 0.0 {
        return 0.0;
    }
    let progress = clamp01(1.0 - fish.eat_anim_timer / fish.eat_anim_duration);
    (progress * PI).sin()
}

/// Belly swell over the course of a pregnancy.
#[must_use]
pub fn pregnancy_swell01(fish: &Fish, now_sec: f64) -> f64 {
    if !matches!(fish.repro.state, ReproPhase::Gravid | ReproPhase::Laying) {
        return 0.0;
    }
    let (Some(start), Some(due)) = (fish.repro.pregnancy_start_sec, fish.repro.due_at_sec) else {
        return 0.0;
    };
    let p = clamp01((now_sec - start) / (due - start).max(0.001));
    0.10 * (p * PI).sin()
}

/// Mouth position, used for reach checks.
#[must_use]
pub fn head_point(fish: &Fish) -> Vec2 {
    let offset = fish.size * 1.32 * 0.22;
    Vec2::new(
        fish.position.x + fish.heading_angle.cos() * offset,
        fish.position.y + fish.heading_angle.sin() * offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::test_fish;

    #[test]
    fn test_heading_tilt_for_left_facing_fish() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.facing = -1;
        fish.heading_angle = PI - 0.2;
        let pose = heading(&fish, &config);
        assert_eq!(pose.facing, -1);
        assert!((pose.tilt + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_render_params_shrink_when_starving() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.life_stage = LifeStage::Adult;
        fish.size = 20.0;
        fish.hunger01 = 0.0;
        let fed = render_params(&fish, &config);
        fish.hunger01 = 1.0;
        let starving = render_params(&fish, &config);
        assert!((fed.body_length - 26.4).abs() < 1e-9);
        assert!(starving.body_height < fed.body_height);
        assert!((starving.condition01 - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_mouth_open_peaks_mid_animation() {
        let mut fish = test_fish(1);
        fish.eat_anim_duration = 0.22;
        fish.eat_anim_timer = 0.11;
        assert!((mouth_open01(&fish) - 1.0).abs() < 1e-9);
        fish.eat_anim_timer = 0.0;
        assert_eq!(mouth_open01(&fish), 0.0);
    }

    #[test]
    fn test_pregnancy_swell() {
        let mut fish = test_fish(1);
        assert_eq!(pregnancy_swell01(&fish, 10.0), 0.0);
        fish.repro.state = ReproPhase::Gravid;
        fish.repro.pregnancy_start_sec = Some(0.0);
        fish.repro.due_at_sec = Some(100.0);
        assert!((pregnancy_swell01(&fish, 50.0) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_head_point_is_ahead_of_body() {
        let mut fish = test_fish(1);
        fish.size = 10.0;
        fish.position = Vec2::new(0.0, 0.0);
        fish.heading_angle = 0.0;
        let head = head_point(&fish);
        assert!((head.x - 2.904).abs() < 1e-9);
        assert_eq!(head.y, 0.0);
    }
}
