//! Run metrics and logging setup.
//!
//! The runner feeds every tick through [`Metrics::record_tick`] and every
//! event through [`Metrics::record_events`]; a summary line is logged every
//! `log_interval` ticks.

use aquarium_data::{WorldEvent, WorldEventKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Counters for one simulation run.
pub struct Metrics {
    tick_count: AtomicU64,
    fish_count: AtomicU64,
    food_count: AtomicU64,
    log_interval: u64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    #[must_use]
    pub fn new(log_interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            fish_count: AtomicU64::new(0),
            food_count: AtomicU64::new(0),
            log_interval: log_interval.max(1),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, fish: usize, food: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.fish_count.store(fish as u64, Ordering::Relaxed);
        self.food_count.store(food as u64, Ordering::Relaxed);

        if tick % self.log_interval == 0 {
            tracing::info!(
                tick,
                fish,
                food,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Bumps one counter per event, keyed by event kind.
    pub fn record_events(&self, events: &[WorldEvent]) {
        for event in events {
            self.increment_counter(event_name(&event.kind));
        }
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn fish_count(&self) -> u64 {
        self.fish_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_count(&self) -> u64 {
        self.food_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn event_name(kind: &WorldEventKind) -> &'static str {
    match kind {
        WorldEventKind::FoodSpawned { .. } => "food_spawned",
        WorldEventKind::FoodConsumed { .. } => "food_consumed",
        WorldEventKind::FoodExpired { .. } => "food_expired",
        WorldEventKind::PoopConsumed { .. } => "poop_consumed",
        WorldEventKind::EggConsumed { .. } => "egg_consumed",
        WorldEventKind::FruitConsumed { .. } => "fruit_consumed",
        WorldEventKind::Mated { .. } => "mated",
        WorldEventKind::ClutchLaid { .. } => "clutch_laid",
        WorldEventKind::Hatched { .. } => "hatched",
        WorldEventKind::HatchFailed { .. } => "hatch_failed",
        WorldEventKind::Died { .. } => "died",
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `level`.
/// Later calls keep the first subscriber.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::default();
        assert_eq!(metrics.tick_count(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new(2);
        metrics.record_tick(Duration::from_millis(16), 5, 3);
        metrics.record_tick(Duration::from_millis(16), 6, 2);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.fish_count(), 6);
        assert_eq!(metrics.food_count(), 2);
    }

    #[test]
    fn test_events_are_counted_by_kind() {
        let metrics = Metrics::default();
        let died = WorldEvent {
            t: 1.0,
            kind: WorldEventKind::Died {
                fish_id: 1,
                reason: None,
            },
        };
        let hatched = WorldEvent {
            t: 2.0,
            kind: WorldEventKind::Hatched {
                egg_id: 4,
                fish_id: 9,
            },
        };
        metrics.record_events(&[died.clone(), hatched, died]);
        assert_eq!(metrics.counter("died"), 2);
        assert_eq!(metrics.counter("hatched"), 1);
        assert_eq!(metrics.counter("mated"), 0);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging("warn");
        init_logging("debug");
    }
}
