use aquarium_core::config::AppConfig;
use aquarium_core::{FixedRng, World};
use rand::RngCore;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    rng: Option<Box<dyn RngCore + Send>>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        Self {
            config,
            rng: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_fish_count(mut self, count: u32) -> Self {
        self.config.world.initial_fish_count = count;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Random source swapped in after the world is populated.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_fixed_rng(self, value: f64) -> Self {
        self.with_rng(Box::new(FixedRng::new(value)))
    }

    pub fn build(self) -> World {
        let mut world = World::new(self.config);
        if let Some(rng) = self.rng {
            world.set_rng(rng);
        }
        world
    }
}

/// Runs `seconds` of simulated time in fixed `dt` ticks.
#[allow(dead_code)]
pub fn run_for(world: &mut World, seconds: f64, dt: f64) -> usize {
    let mut ticks = 0;
    let mut elapsed = 0.0;
    while elapsed < seconds {
        world.update(dt);
        elapsed += dt;
        ticks += 1;
    }
    ticks
}
