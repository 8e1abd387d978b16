use crate::config::AppConfig;
use crate::rng::{range, range_of, unit};
use aquarium_data::{SpeciesProfile, Traits};
use rand::Rng;

/// Fresh traits for a fish that did not hatch from an egg.
pub fn random_traits<R: Rng + ?Sized>(
    species: &SpeciesProfile,
    config: &AppConfig,
    rng: &mut R,
) -> Traits {
    let age = &config.age;
    let lifespan = range(
        rng,
        age.lifespan_mean_sec - age.lifespan_jitter_sec,
        age.lifespan_mean_sec + age.lifespan_jitter_sec,
    ) * species.lifespan_scale;
    Traits {
        color_hue: range_of(rng, config.fish.hue_range),
        size_factor: range_of(rng, config.growth.size_factor_range),
        growth_rate: range_of(rng, config.growth.growth_rate_range),
        lifespan_sec: lifespan.max(age.min_lifespan_sec),
        speed_factor: range_of(rng, config.fish.speed_factor_range),
        pattern_seed: unit(rng),
    }
}

fn mutate<R: Rng + ?Sized>(value: f64, pct: f64, rng: &mut R) -> f64 {
    value * (1.0 + range(rng, -pct, pct))
}

/// Parents' mean with a bounded multiplicative mutation per trait.
pub fn inherit_traits<R: Rng + ?Sized>(
    mother: &Traits,
    father: &Traits,
    config: &AppConfig,
    rng: &mut R,
) -> Traits {
    let pct = config.reproduction.trait_mutation_pct;
    let mean = |a: f64, b: f64| (a + b) * 0.5;
    Traits {
        color_hue: mutate(mean(mother.color_hue, father.color_hue), pct, rng).rem_euclid(360.0),
        size_factor: mutate(mean(mother.size_factor, father.size_factor), pct, rng).clamp(0.6, 1.4),
        growth_rate: mutate(mean(mother.growth_rate, father.growth_rate), pct, rng).clamp(0.5, 1.8),
        lifespan_sec: mutate(mean(mother.lifespan_sec, father.lifespan_sec), pct, rng)
            .max(config.age.min_lifespan_sec),
        speed_factor: mutate(mean(mother.speed_factor, father.speed_factor), pct, rng)
            .clamp(0.6, 1.6),
        pattern_seed: if unit(rng) < 0.5 {
            mother.pattern_seed
        } else {
            father.pattern_seed
        },
    }
}
