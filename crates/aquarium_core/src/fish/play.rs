use crate::config::AppConfig;
use crate::geometry::clamp01;
use crate::rng::range_of;
use aquarium_data::{Fish, HungerState, LifeStage, PlayRole, PlayState};
use rand::Rng;

/// Assignment handed to a fish when it joins a play session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayAssignment {
    pub session_id: u64,
    pub role: PlayRole,
    pub target_fish_id: Option<u64>,
    pub until_sec: f64,
    pub near_algae: bool,
}

#[must_use]
pub fn is_playing(fish: &Fish, now_sec: f64) -> bool {
    fish.play_state.session_id.is_some() && now_sec < fish.play_state.active_until_sec
}

#[must_use]
pub fn can_start_play(fish: &Fish, now_sec: f64, config: &AppConfig) -> bool {
    fish.is_alive()
        && fish.life_stage != LifeStage::Old
        && fish.play_state.session_id.is_none()
        && now_sec >= fish.play_state.cooldown_until_sec
        && fish.hunger_state == HungerState::Fed
        && fish.wellbeing01 >= config.play.min_wellbeing
}

pub fn start_play<R: Rng + ?Sized>(
    fish: &mut Fish,
    assignment: PlayAssignment,
    now_sec: f64,
    config: &AppConfig,
    rng: &mut R,
) {
    let cooldown = now_sec + range_of(rng, config.play.cooldown_sec);
    fish.play_state = PlayState {
        session_id: Some(assignment.session_id),
        active_until_sec: assignment.until_sec,
        target_fish_id: assignment.target_fish_id,
        role: assignment.role,
        started_near_algae: assignment.near_algae,
        cooldown_until_sec: fish.play_state.cooldown_until_sec.max(cooldown),
    };
    fish.wellbeing01 = clamp01(fish.wellbeing01 + config.play.wellbeing_bonus);
}

pub fn stop_play<R: Rng + ?Sized>(fish: &mut Fish, now_sec: f64, config: &AppConfig, rng: &mut R) {
    let cooldown = now_sec + range_of(rng, config.play.cooldown_sec);
    fish.play_state = PlayState {
        cooldown_until_sec: fish.play_state.cooldown_until_sec.max(cooldown),
        ..PlayState::default()
    };
    if fish.behavior.is_playing() {
        fish.behavior = aquarium_data::Behavior::Wander;
    }
}

pub fn delay_play_eligibility(fish: &mut Fish, until_sec: f64) {
    fish.play_state.cooldown_until_sec = fish.play_state.cooldown_until_sec.max(until_sec);
}

/// Stage-dependent odds of a play encounter turning into a session.
#[must_use]
pub fn play_probability(fish: &Fish, near_algae: bool, config: &AppConfig) -> f64 {
    let p = &config.play;
    let pick = |pair: [f64; 2]| if near_algae { pair[0] } else { pair[1] };
    match fish.life_stage {
        LifeStage::Baby => pick(p.baby_probability),
        LifeStage::Juvenile => pick(p.juvenile_probability),
        LifeStage::Adult => p.adult_probability,
        LifeStage::Old => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::test_fish;
    use crate::rng::FixedRng;

    fn playful() -> Fish {
        let mut fish = test_fish(1);
        fish.hunger_state = HungerState::Fed;
        fish.wellbeing01 = 0.9;
        fish.life_stage = LifeStage::Juvenile;
        fish
    }

    #[test]
    fn test_start_and_stop_play() {
        let config = AppConfig::default();
        let mut fish = playful();
        assert!(can_start_play(&fish, 0.0, &config));
        let mut rng = FixedRng::new(0.0);
        start_play(
            &mut fish,
            PlayAssignment {
                session_id: 1,
                role: PlayRole::Chaser,
                target_fish_id: Some(2),
                until_sec: 5.0,
                near_algae: false,
            },
            0.0,
            &config,
            &mut rng,
        );
        assert!(is_playing(&fish, 1.0));
        assert!(!can_start_play(&fish, 1.0, &config));
        assert!((fish.wellbeing01 - 0.93).abs() < 1e-9);

        stop_play(&mut fish, 5.0, &config, &mut rng);
        assert!(!is_playing(&fish, 5.0));
        assert_eq!(fish.play_state.cooldown_until_sec, 10.0);
        assert!(!can_start_play(&fish, 9.0, &config));
        assert!(can_start_play(&fish, 10.0, &config));
    }

    #[test]
    fn test_old_and_hungry_fish_do_not_play() {
        let config = AppConfig::default();
        let mut fish = playful();
        fish.life_stage = LifeStage::Old;
        assert!(!can_start_play(&fish, 0.0, &config));
        let mut fish = playful();
        fish.hunger_state = HungerState::Hungry;
        assert!(!can_start_play(&fish, 0.0, &config));
    }

    #[test]
    fn test_play_probability_by_stage() {
        let config = AppConfig::default();
        let mut fish = playful();
        fish.life_stage = LifeStage::Baby;
        assert_eq!(play_probability(&fish, true, &config), 0.8);
        assert_eq!(play_probability(&fish, false, &config), 0.5);
        fish.life_stage = LifeStage::Adult;
        assert_eq!(play_probability(&fish, true, &config), 0.2);
    }

    #[test]
    fn test_delay_only_extends() {
        let mut fish = playful();
        delay_play_eligibility(&mut fish, 20.0);
        delay_play_eligibility(&mut fish, 5.0);
        assert_eq!(fish.play_state.cooldown_until_sec, 20.0);
    }
}
