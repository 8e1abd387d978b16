//! Chase games between small groups of content fish.

use super::World;
use crate::fish::play::{
    can_start_play, delay_play_eligibility, is_playing, play_probability, start_play, stop_play,
};
use crate::fish::PlayAssignment;
use crate::rng::{chance, range_of, unit};
use aquarium_data::{Fish, PlayRole, Vec2};
use std::collections::HashSet;

/// One running chase: a single runner and one or more chasers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySession {
    pub id: u64,
    pub runner_id: u64,
    pub chaser_ids: Vec<u64>,
    pub until_sec: f64,
    pub near_algae: bool,
}

fn in_session(fish: &Fish, session_id: u64, now_sec: f64) -> bool {
    fish.play_state.session_id == Some(session_id) && is_playing(fish, now_sec)
}

impl World {
    pub(crate) fn update_play(&mut self) {
        let now = self.sim_time_sec;
        self.release_stale_players(now);
        self.update_play_sessions(now);
        self.expand_play_sessions(now);
        self.try_start_play_session(now);
    }

    fn is_near_algae(&self, point: Vec2) -> bool {
        self.ground_algae
            .iter()
            .any(|a| Vec2::new(a.x, a.y).distance_to(point) <= a.radius)
    }

    fn release_stale_players(&mut self, now: f64) {
        let known: HashSet<u64> = self.play_sessions.iter().map(|s| s.id).collect();
        let rng = &mut *self.rng;
        for fish in &mut self.fish {
            let Some(session_id) = fish.play_state.session_id else {
                continue;
            };
            if !fish.is_alive() || !is_playing(fish, now) || !known.contains(&session_id) {
                stop_play(fish, now, &self.config, &mut *rng);
            }
        }
    }

    fn update_play_sessions(&mut self, now: f64) {
        let sessions = std::mem::take(&mut self.play_sessions);
        let mut kept = Vec::with_capacity(sessions.len());

        for mut session in sessions {
            let sid = session.id;
            let runner = self
                .fish
                .iter()
                .find(|f| f.id == session.runner_id && in_session(f, sid, now))
                .map(|f| f.position);
            session
                .chaser_ids
                .retain(|id| self.fish.iter().any(|f| f.id == *id && in_session(f, sid, now)));

            let Some(runner_pos) = runner.filter(|_| !session.chaser_ids.is_empty() && now < session.until_sec)
            else {
                self.end_play_session(sid, now);
                continue;
            };

            let closest_chaser = session
                .chaser_ids
                .iter()
                .filter_map(|id| self.fish.iter().find(|f| f.id == *id))
                .min_by(|a, b| {
                    a.position
                        .distance_to(runner_pos)
                        .total_cmp(&b.position.distance_to(runner_pos))
                })
                .map(|f| f.id);

            for fish in &mut self.fish {
                if fish.id == session.runner_id {
                    fish.play_state.role = PlayRole::Runner;
                    fish.play_state.target_fish_id = closest_chaser;
                } else if session.chaser_ids.contains(&fish.id) {
                    fish.play_state.role = PlayRole::Chaser;
                    fish.play_state.target_fish_id = Some(session.runner_id);
                }
            }
            kept.push(session);
        }
        self.play_sessions = kept;
    }

    fn end_play_session(&mut self, session_id: u64, now: f64) {
        let rng = &mut *self.rng;
        for fish in &mut self.fish {
            if fish.play_state.session_id == Some(session_id) {
                stop_play(fish, now, &self.config, &mut *rng);
            }
        }
        tracing::debug!(session_id, "Play session ended");
    }

    fn expand_play_sessions(&mut self, now: f64) {
        let join_radius = self.config.play.join_radius;
        let join_chance = self.config.play.join_chance;

        for si in 0..self.play_sessions.len() {
            let session = &self.play_sessions[si];
            let (sid, runner_id, until_sec, near_algae) =
                (session.id, session.runner_id, session.until_sec, session.near_algae);
            let Some(runner_pos) = self
                .fish
                .iter()
                .find(|f| f.id == runner_id && in_session(f, sid, now))
                .map(|f| f.position)
            else {
                continue;
            };

            for index in 0..self.fish.len() {
                let fish = &self.fish[index];
                if !can_start_play(fish, now, &self.config)
                    || fish.position.distance_to(runner_pos) > join_radius
                {
                    continue;
                }
                if unit(&mut *self.rng) > join_chance {
                    continue;
                }
                let assignment = PlayAssignment {
                    session_id: sid,
                    role: PlayRole::Chaser,
                    target_fish_id: Some(runner_id),
                    until_sec,
                    near_algae,
                };
                let fish = &mut self.fish[index];
                start_play(fish, assignment, now, &self.config, &mut *self.rng);
                let fish_id = fish.id;
                self.play_sessions[si].chaser_ids.push(fish_id);
            }
        }
    }

    /// Starts at most one new session per tick.
    fn try_start_play_session(&mut self, now: f64) {
        let count = self.fish.len();
        if count < 2 {
            return;
        }
        let cfg = self.config.play.clone();

        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = (&self.fish[i], &self.fish[j]);
                if !can_start_play(a, now, &self.config)
                    || !can_start_play(b, now, &self.config)
                    || a.position.distance_to(b.position) > cfg.encounter_radius
                {
                    continue;
                }
                let mid = a.position.midpoint(b.position);
                let near_algae = self.is_near_algae(mid);
                let p = (play_probability(a, near_algae, &self.config)
                    + play_probability(b, near_algae, &self.config))
                    * 0.5;

                if unit(&mut *self.rng) > p {
                    let until = now + cfg.failed_roll_delay_sec;
                    delay_play_eligibility(&mut self.fish[i], until);
                    delay_play_eligibility(&mut self.fish[j], until);
                    continue;
                }

                let until_sec = now + range_of(&mut *self.rng, cfg.duration_sec);
                let (runner, first_chaser) = if chance(&mut *self.rng, 0.5) {
                    (i, j)
                } else {
                    (j, i)
                };
                let session_id = self.next_ids.play_session;
                self.next_ids.play_session += 1;
                let runner_id = self.fish[runner].id;
                let first_chaser_id = self.fish[first_chaser].id;

                let assign = |role, target| PlayAssignment {
                    session_id,
                    role,
                    target_fish_id: Some(target),
                    until_sec,
                    near_algae,
                };
                start_play(
                    &mut self.fish[runner],
                    assign(PlayRole::Runner, first_chaser_id),
                    now,
                    &self.config,
                    &mut *self.rng,
                );
                start_play(
                    &mut self.fish[first_chaser],
                    assign(PlayRole::Chaser, runner_id),
                    now,
                    &self.config,
                    &mut *self.rng,
                );

                let mut chaser_ids = vec![first_chaser_id];
                let recruit_radius = cfg.encounter_radius * cfg.recruit_radius_scale;
                for k in 0..count {
                    if chaser_ids.len() >= cfg.max_chasers {
                        break;
                    }
                    let candidate = &self.fish[k];
                    if k == i
                        || k == j
                        || !can_start_play(candidate, now, &self.config)
                        || candidate.position.distance_to(mid) > recruit_radius
                    {
                        continue;
                    }
                    if unit(&mut *self.rng) >= cfg.recruit_chance {
                        continue;
                    }
                    let candidate_id = candidate.id;
                    start_play(
                        &mut self.fish[k],
                        assign(PlayRole::Chaser, runner_id),
                        now,
                        &self.config,
                        &mut *self.rng,
                    );
                    chaser_ids.push(candidate_id);
                }

                tracing::debug!(
                    session_id,
                    runner_id,
                    chasers = chaser_ids.len(),
                    near_algae,
                    "Play session started"
                );
                self.play_sessions.push(PlaySession {
                    id: session_id,
                    runner_id,
                    chaser_ids,
                    until_sec,
                    near_algae,
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::world_with;
    use super::*;
    use crate::rng::FixedRng;
    use aquarium_data::{HungerState, LifeStage};

    fn playful_world(fish: u32) -> World {
        let mut world = world_with(fish, 11);
        world.ground_algae.clear();
        for (n, f) in world.fish.iter_mut().enumerate() {
            f.hunger_state = HungerState::Fed;
            f.wellbeing01 = 0.95;
            f.life_stage = LifeStage::Baby;
            f.play_state = Default::default();
            f.position = Vec2::new(300.0 + n as f64 * 10.0, 200.0);
        }
        world
    }

    #[test]
    fn test_session_starts_with_runner_and_chasers() {
        let mut world = playful_world(4);
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_play();
        assert_eq!(world.play_sessions().len(), 1);
        let session = &world.play_sessions()[0];
        assert_eq!(session.chaser_ids.len(), 3);
        let runner = world.fish_by_id(session.runner_id).unwrap();
        assert_eq!(runner.play_state.role, PlayRole::Runner);
        assert!(session.until_sec >= 4.0 && session.until_sec <= 7.0);
    }

    #[test]
    fn test_failed_roll_delays_both_fish() {
        let mut world = playful_world(2);
        world.set_rng(Box::new(FixedRng::new(0.99)));
        world.update_play();
        assert!(world.play_sessions().is_empty());
        for fish in &world.fish {
            assert_eq!(fish.play_state.cooldown_until_sec, 10.0);
        }
    }

    #[test]
    fn test_session_ends_when_time_runs_out() {
        let mut world = playful_world(2);
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_play();
        assert_eq!(world.play_sessions().len(), 1);
        world.sim_time_sec = 100.0;
        world.update_play();
        assert!(world.play_sessions().is_empty());
        assert!(world.fish.iter().all(|f| f.play_state.session_id.is_none()));
    }

    #[test]
    fn test_far_apart_fish_do_not_play() {
        let mut world = playful_world(2);
        world.fish[1].position = Vec2::new(900.0, 500.0);
        world.set_rng(Box::new(FixedRng::new(0.0)));
        world.update_play();
        assert!(world.play_sessions().is_empty());
    }
}
