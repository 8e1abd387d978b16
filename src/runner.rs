//! Bounded stepping, autosave and the ecosystem-failed terminal state.

use aquarium_core::{AppConfig, Metrics, World};
use aquarium_data::{EcosystemReport, WorldEvent};
use aquarium_io::SaveStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// How a wall-clock gap is turned into ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StepMode {
    /// One tick per frame, capped at the max frame step.
    Visible,
    /// The whole gap in fixed hidden steps.
    #[default]
    Hidden,
}

/// Printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub config_fingerprint: String,
    pub seed: Option<u64>,
    pub started_at: String,
    pub ecosystem_failed: bool,
    pub ticks: u64,
    pub sim_time_sec: f64,
    pub alive_count: usize,
    pub speed_multiplier: f64,
    pub hygiene01: f64,
    pub report: EcosystemReport,
}

pub struct Runner {
    config: AppConfig,
    world: World,
    store: Option<SaveStore>,
    metrics: Metrics,
    mode: StepMode,
    failed: bool,
    since_autosave_sec: f64,
    started_at: DateTime<Utc>,
}

impl Runner {
    /// Starts a fresh world.
    #[must_use]
    pub fn new(config: AppConfig, store: Option<SaveStore>, mode: StepMode) -> Self {
        tracing::info!(fingerprint = %config.fingerprint(), ?mode, "Runner starting");
        let metrics = Metrics::new(config.runner.metrics_log_interval);
        let world = World::new(config.clone());
        let mut runner = Self {
            config,
            world,
            store,
            metrics,
            mode,
            failed: false,
            since_autosave_sec: 0.0,
            started_at: Utc::now(),
        };
        runner.check_failure();
        runner
    }

    /// Starts from the save when one is usable, else fresh.
    #[must_use]
    pub fn resume(config: AppConfig, store: SaveStore, mode: StepMode) -> Self {
        let mut runner = Self::new(config, None, mode);
        match store.restore_into(&mut runner.world) {
            Ok(true) => tracing::info!(
                sim_time_sec = runner.world.sim_time_sec,
                fish = runner.world.fish.len(),
                "Resumed from save"
            ),
            Ok(false) => tracing::info!("No usable save, starting fresh"),
            Err(e) => {
                tracing::warn!(error = %e, "Save unreadable, starting fresh");
                runner.world = World::new(runner.config.clone());
            }
        }
        runner.store = Some(store);
        runner.failed = false;
        runner.check_failure();
        runner
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    /// Advances by `raw_sec` of wall-clock time and returns every event.
    pub fn advance(&mut self, raw_sec: f64) -> Vec<WorldEvent> {
        if self.failed || !raw_sec.is_finite() || raw_sec <= 0.0 {
            return Vec::new();
        }
        let max_frame = self.config.runner.max_frame_sec;
        let step = self.config.runner.hidden_step_sec;
        match self.mode {
            StepMode::Visible => self.step(raw_sec.min(max_frame)),
            StepMode::Hidden => {
                let mut remaining = raw_sec;
                let mut events = Vec::new();
                while remaining > 1e-9 && !self.failed {
                    let dt = remaining.min(step);
                    events.extend(self.step(dt));
                    remaining -= dt;
                }
                events
            }
        }
    }

    fn step(&mut self, dt: f64) -> Vec<WorldEvent> {
        let started = Instant::now();
        let events = self.world.update(dt);
        self.metrics
            .record_tick(started.elapsed(), self.world.alive_count(), self.world.food.len());
        self.metrics.record_events(&events);

        if !self.check_failure() {
            self.since_autosave_sec += dt;
            if self.since_autosave_sec >= self.config.runner.autosave_interval_sec {
                self.since_autosave_sec = 0.0;
                self.autosave();
            }
        }
        events
    }

    /// Latches the failed state once no fish is alive. Returns the state.
    fn check_failure(&mut self) -> bool {
        if self.failed || !self.world.is_ecosystem_failed() {
            return self.failed;
        }
        self.failed = true;
        self.world.paused = true;
        self.metrics.increment_counter("ecosystem_failed");
        tracing::warn!(
            sim_time_sec = self.world.sim_time_sec,
            deaths = self.world.deaths_count,
            "Ecosystem failed"
        );
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "Could not clear save");
            }
        }
        true
    }

    /// Writes the save unless the run has failed.
    pub fn autosave(&self) {
        if self.failed {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.world) {
                tracing::warn!(error = %e, "Autosave failed");
            }
        }
    }

    /// Replaces the world with a fresh one and clears the failed state.
    pub fn restart(&mut self) {
        self.world = World::new(self.config.clone());
        self.failed = false;
        self.since_autosave_sec = 0.0;
        tracing::info!("World restarted");
        self.check_failure();
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            config_fingerprint: self.config.fingerprint(),
            seed: self.config.world.seed,
            started_at: self.started_at.to_rfc3339(),
            ecosystem_failed: self.failed,
            ticks: self.metrics.tick_count(),
            sim_time_sec: self.world.sim_time_sec,
            alive_count: self.world.alive_count(),
            speed_multiplier: self.world.speed_multiplier,
            hygiene01: self.world.water.hygiene01,
            report: self.world.ecosystem_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::fish::lifecycle::mark_dead;
    use aquarium_data::DeathReason;

    fn config(seed: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.world.seed = Some(seed);
        config
    }

    #[test]
    fn test_visible_mode_caps_frame() {
        let mut runner = Runner::new(config(1), None, StepMode::Visible);
        runner.advance(5.0);
        assert!((runner.world().sim_time_sec - 0.25).abs() < 1e-9);
        assert_eq!(runner.metrics().tick_count(), 1);
    }

    #[test]
    fn test_hidden_mode_splits_gap() {
        let mut runner = Runner::new(config(1), None, StepMode::Hidden);
        runner.advance(2.1);
        assert!((runner.world().sim_time_sec - 2.1).abs() < 1e-9);
        assert_eq!(runner.metrics().tick_count(), 9);
    }

    #[test]
    fn test_failure_pauses_and_clears_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("save.json"));
        let mut runner = Runner::new(config(2), Some(store.clone()), StepMode::Hidden);
        runner.autosave();
        assert!(store.exists());

        let now = runner.world().sim_time_sec;
        for fish in &mut runner.world_mut().fish {
            mark_dead(fish, DeathReason::Starvation, now);
        }
        runner.advance(0.25);
        assert!(runner.is_failed());
        assert!(runner.world().paused);
        assert!(!store.exists());

        let ticks = runner.metrics().tick_count();
        runner.advance(1.0);
        assert_eq!(runner.metrics().tick_count(), ticks);

        runner.restart();
        assert!(!runner.is_failed());
        assert!(runner.world().alive_count() > 0);
    }

    #[test]
    fn test_autosave_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("save.json"));
        let mut runner = Runner::new(config(3), Some(store.clone()), StepMode::Hidden);
        runner.advance(9.75);
        assert!(!store.exists());
        runner.advance(0.25);
        assert!(store.exists());
    }

    #[test]
    fn test_summary_carries_fingerprint() {
        let runner = Runner::new(config(4), None, StepMode::Hidden);
        let summary = runner.summary();
        assert_eq!(summary.config_fingerprint.len(), 64);
        assert_eq!(summary.seed, Some(4));
        assert!(!summary.ecosystem_failed);
        assert_eq!(summary.alive_count, runner.world().fish.len());
    }
}
