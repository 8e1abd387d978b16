use super::hover;
use crate::snapshot::FishContext;
use aquarium_data::{
    Behavior, DietItem, EdibleKind, EdibleRef, Fish, HungerState, PlayRole, ReproPhase, Vec2,
};
use rand::Rng;

/// Nearest edible the fish's diet allows, within its vision radius.
#[must_use]
pub fn find_nearest_edible(fish: &Fish, ctx: &FishContext<'_>) -> Option<(EdibleRef, Vec2)> {
    let hunger = &ctx.config.hunger;
    let species = ctx.config.species.get(fish.species_id);
    let hungry = matches!(fish.hunger_state, HungerState::Hungry | HungerState::Starving);
    let starving = fish.hunger_state == HungerState::Starving;

    let vision = match fish.hunger_state {
        HungerState::Starving => hunger.vision_starving,
        HungerState::Hungry | HungerState::Fed => hunger.vision_hungry,
        HungerState::Dead => return None,
    };

    let mut best: Option<(EdibleRef, Vec2, f64)> = None;
    let mut consider = |kind: EdibleKind, id: u64, pos: Vec2| {
        let d = fish.position.distance_to(pos);
        if d > vision {
            return;
        }
        if best.as_ref().map_or(true, |(_, _, bd)| d < *bd) {
            best = Some((EdibleRef { kind, id }, pos, d));
        }
    };

    let pellets = (species.eats(DietItem::Pellet) && hungry)
        || (species.eats(DietItem::PelletWhenStarving) && starving);
    if pellets {
        for food in ctx.food {
            consider(EdibleKind::Pellet, food.id, Vec2::new(food.x, food.y));
        }
    }
    if species.eats(DietItem::Fruit) && hungry {
        for fruit in ctx.fruits {
            consider(EdibleKind::Fruit, fruit.id, fruit.position);
        }
    }
    if species.eats(DietItem::Poop) {
        for poop in ctx.poop.iter().filter(|p| p.can_be_eaten) {
            consider(EdibleKind::Poop, poop.id, Vec2::new(poop.x, poop.y));
        }
    }
    if species.eats(DietItem::EggWhenStarving)
        && starving
        && ctx.now_sec >= fish.egg_snack_cooldown_until_sec
    {
        for egg in ctx.eggs.iter().filter(|e| ctx.egg_is_snackable(e)) {
            consider(EdibleKind::Egg, egg.id, Vec2::new(egg.x, egg.y));
        }
    }

    best.map(|(target, pos, _)| (target, pos))
}

/// Priority chain: dead, laying, playing, fed, food, wander.
pub fn decide_behavior<R: Rng + ?Sized>(fish: &mut Fish, ctx: &FishContext<'_>, rng: &mut R) {
    fish.behavior = choose(fish, ctx);
    if let Behavior::SeekFood { .. } = fish.behavior {
        if let Some(pos) = fish.behavior.food_target().and_then(|t| ctx.edible_position(t)) {
            fish.target = pos;
        }
    }
    hover::update_after_behavior(fish, ctx, rng);
}

fn choose(fish: &Fish, ctx: &FishContext<'_>) -> Behavior {
    if !fish.is_alive() {
        return Behavior::DeadSink;
    }
    if fish.repro.state == ReproPhase::Laying && fish.repro.lay_target.is_some() {
        return Behavior::SeekLayTarget;
    }

    let play = &fish.play_state;
    if play.session_id.is_some() && ctx.now_sec < play.active_until_sec {
        match play.role {
            PlayRole::Runner => {
                return Behavior::PlayEvade {
                    target_fish_id: play.target_fish_id,
                    speed_boost: ctx.config.play.runner_boost,
                }
            }
            PlayRole::Chaser => {
                return Behavior::PlayChase {
                    target_fish_id: play.target_fish_id,
                    speed_boost: ctx.config.play.chaser_boost,
                }
            }
            PlayRole::None => {}
        }
    }

    let species = ctx.config.species.get(fish.species_id);
    if fish.hunger_state == HungerState::Fed && !species.eats(DietItem::Poop) {
        return Behavior::Wander;
    }

    match find_nearest_edible(fish, ctx) {
        Some((target, _)) => {
            let hunger = &ctx.config.hunger;
            let speed_boost = match fish.hunger_state {
                HungerState::Starving => hunger.boost_starving,
                HungerState::Hungry => hunger.boost_hungry,
                _ => 1.0,
            };
            Behavior::SeekFood {
                target,
                speed_boost,
            }
        }
        None => Behavior::Wander,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::fish::test_fish;
    use crate::rng::FixedRng;
    use crate::snapshot::FruitSpot;
    use aquarium_data::{Bounds, Egg, EggState, Food, Poop, SpeciesId, Traits};

    fn pellet(id: u64, x: f64, y: f64) -> Food {
        Food {
            id,
            x,
            y,
            amount: 1.0,
            ttl: 100.0,
            vy: 0.0,
        }
    }

    fn ctx<'a>(
        config: &'a AppConfig,
        food: &'a [Food],
        poop: &'a [Poop],
        eggs: &'a [Egg],
        fruits: &'a [FruitSpot],
    ) -> FishContext<'a> {
        FishContext {
            config,
            bounds: Bounds::new(1200.0, 700.0),
            now_sec: 10.0,
            hygiene01: 1.0,
            fish: &[],
            food,
            poop,
            eggs,
            fruits,
        }
    }

    #[test]
    fn test_hungry_fish_seeks_nearest_pellet() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.position = Vec2::new(100.0, 100.0);
        fish.hunger_state = HungerState::Hungry;
        let food = vec![pellet(1, 300.0, 100.0), pellet(2, 150.0, 100.0)];
        let mut rng = FixedRng::new(0.5);
        decide_behavior(&mut fish, &ctx(&config, &food, &[], &[], &[]), &mut rng);
        assert_eq!(
            fish.behavior,
            Behavior::SeekFood {
                target: EdibleRef {
                    kind: EdibleKind::Pellet,
                    id: 2
                },
                speed_boost: 1.3
            }
        );
        assert_eq!(fish.target, Vec2::new(150.0, 100.0));
    }

    #[test]
    fn test_vision_radius_depends_on_hunger() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.position = Vec2::new(100.0, 100.0);
        fish.hunger_state = HungerState::Hungry;
        let food = vec![pellet(1, 600.0, 100.0)];
        let mut rng = FixedRng::new(0.5);
        let c = ctx(&config, &food, &[], &[], &[]);
        decide_behavior(&mut fish, &c, &mut rng);
        assert_eq!(fish.behavior, Behavior::Wander);
        fish.hunger_state = HungerState::Starving;
        decide_behavior(&mut fish, &c, &mut rng);
        assert_eq!(fish.behavior.speed_boost(), 1.6);
    }

    #[test]
    fn test_fed_fish_wanders() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.hunger_state = HungerState::Fed;
        let food = vec![pellet(1, fish.position.x, fish.position.y)];
        let mut rng = FixedRng::new(0.5);
        decide_behavior(&mut fish, &ctx(&config, &food, &[], &[], &[]), &mut rng);
        assert_eq!(fish.behavior, Behavior::Wander);
    }

    #[test]
    fn test_laying_beats_food() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.hunger_state = HungerState::Starving;
        fish.repro.state = ReproPhase::Laying;
        fish.repro.lay_target = Some(Vec2::new(50.0, 650.0));
        let food = vec![pellet(1, fish.position.x, fish.position.y)];
        let mut rng = FixedRng::new(0.5);
        decide_behavior(&mut fish, &ctx(&config, &food, &[], &[], &[]), &mut rng);
        assert_eq!(fish.behavior, Behavior::SeekLayTarget);
    }

    #[test]
    fn test_fruit_eater_ignores_pellets() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.species_id = SpeciesId::AzureDart;
        fish.position = Vec2::new(100.0, 100.0);
        fish.hunger_state = HungerState::Hungry;
        let food = vec![pellet(1, 110.0, 100.0)];
        let fruits = vec![FruitSpot {
            id: 7,
            position: Vec2::new(200.0, 100.0),
        }];
        let c = ctx(&config, &food, &[], &[], &fruits);
        let found = find_nearest_edible(&fish, &c).map(|(t, _)| t);
        assert_eq!(
            found,
            Some(EdibleRef {
                kind: EdibleKind::Fruit,
                id: 7
            })
        );
    }

    #[test]
    fn test_silt_sifter_forages_poop_when_fed() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.species_id = SpeciesId::SiltSifter;
        fish.position = Vec2::new(100.0, 600.0);
        fish.hunger_state = HungerState::Fed;
        let poop = vec![Poop {
            id: 3,
            x: 150.0,
            y: 650.0,
            ttl_sec: 50.0,
            max_ttl_sec: 120.0,
            vx: 0.0,
            vy: 0.0,
            can_be_eaten: true,
            nutrition: 0.5,
            bioload_factor: 1.0,
        }];
        let food = vec![pellet(1, 110.0, 600.0)];
        let mut rng = FixedRng::new(0.5);
        decide_behavior(&mut fish, &ctx(&config, &food, &poop, &[], &[]), &mut rng);
        assert_eq!(fish.behavior.food_target().map(|t| t.id), Some(3));
        assert_eq!(fish.behavior.speed_boost(), 1.0);
    }

    #[test]
    fn test_starving_silt_sifter_skips_protected_eggs() {
        let config = AppConfig::default();
        let mut fish = test_fish(1);
        fish.species_id = SpeciesId::SiltSifter;
        fish.position = Vec2::new(100.0, 600.0);
        fish.hunger_state = HungerState::Starving;
        let egg = |id, protected| Egg {
            id,
            x: 120.0,
            y: 600.0,
            laid_at_sec: 0.0,
            hatch_at_sec: 500.0,
            mother_id: None,
            father_id: None,
            mother_traits: Traits::default(),
            father_traits: Traits::default(),
            species_id: SpeciesId::LabMinnow,
            state: EggState::Incubating,
            can_be_eaten: true,
            nutrition: 0.25,
            is_protected_by_nestbrush: protected,
            nestbrush_attachment: None,
        };
        let eggs = vec![egg(1, true), egg(2, false)];
        let c = ctx(&config, &[], &[], &eggs, &[]);
        assert_eq!(find_nearest_edible(&fish, &c).map(|(t, _)| t.id), Some(2));

        fish.egg_snack_cooldown_until_sec = 100.0;
        assert_eq!(find_nearest_edible(&fish, &c), None);
    }
}
