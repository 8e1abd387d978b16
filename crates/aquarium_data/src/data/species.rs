use serde::{Deserialize, Serialize};

/// Identifier of a fish species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeciesId {
    /// Baseline species present from the first tick.
    #[default]
    LabMinnow,
    /// Small schooling fruit eater, unlocked by the berry reed.
    AzureDart,
    /// Bottom dweller that cleans up poop and stray eggs.
    SiltSifter,
}

impl SpeciesId {
    pub const ALL: [SpeciesId; 3] = [
        SpeciesId::LabMinnow,
        SpeciesId::AzureDart,
        SpeciesId::SiltSifter,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpeciesId::LabMinnow => "LAB_MINNOW",
            SpeciesId::AzureDart => "AZURE_DART",
            SpeciesId::SiltSifter => "SILT_SIFTER",
        }
    }
}

/// Things a species may eat, with the hunger condition that gates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DietItem {
    /// Pellets whenever hungry or starving.
    Pellet,
    /// Pellets only while starving.
    PelletWhenStarving,
    /// Berry reed fruit whenever hungry or starving.
    Fruit,
    /// Settled or sinking poop, even when fed.
    Poop,
    /// Unprotected eggs while starving, rate-limited by a snack cooldown.
    EggWhenStarving,
}

/// How a clutch size is drawn when a female lays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClutchRule {
    /// Uniform integer in `[min, max]`.
    Range { min: u32, max: u32 },
    /// Uniform pick from a fixed list.
    Choice { sizes: Vec<u32> },
    /// Cumulative-weight pick; weights need not sum to one.
    Weighted { sizes: Vec<u32>, weights: Vec<f64> },
}

/// Loose schooling parameters. Disabled profiles exert no force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolingProfile {
    pub enabled: bool,
    /// Range for the per-fish bias multiplier drawn at creation.
    pub bias_range: [f64; 2],
    /// Duration of a window in which the fish ignores the school.
    pub solo_window_sec: [f64; 2],
    /// Delay between solo windows.
    pub solo_cooldown_sec: [f64; 2],
    pub cohesion: f64,
    pub separation: f64,
    pub alignment: f64,
    pub neighbor_radius: f64,
    pub separation_radius: f64,
    /// Upper bound on the magnitude of the combined schooling force.
    pub max_influence: f64,
}

impl SchoolingProfile {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            bias_range: [0.0, 0.0],
            solo_window_sec: [0.0, 0.0],
            solo_cooldown_sec: [0.0, 0.0],
            cohesion: 0.0,
            separation: 0.0,
            alignment: 0.0,
            neighbor_radius: 0.0,
            separation_radius: 0.0,
            max_influence: 0.0,
        }
    }
}

/// Bottom-band preference for species that live near the substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottomDwellerProfile {
    /// Band start as a fraction of the swim height.
    pub band_start01: f64,
    pub band_end01: f64,
    pub steer_bias_strength: f64,
    /// Horizontal step between wander targets while scanning the floor.
    pub scan_step_x_px: [f64; 2],
    pub scan_jitter_y_px: f64,
    /// Chance that a retarget dips towards the substrate.
    pub probe_chance: f64,
    pub probe_depth_px: [f64; 2],
}

/// Extra mating chance granted when eggs were eaten recently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggMateBoost {
    pub window_sec: f64,
    pub multiplier: f64,
}

/// Static per-species configuration. Species-specific behaviour is
/// selected by reading these fields, never by matching on [`SpeciesId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesProfile {
    pub id: SpeciesId,
    pub display_name: String,
    pub diet: Vec<DietItem>,
    pub adult_size_scale: f64,
    pub speed_scale: f64,
    pub lifespan_scale: f64,
    /// Scales gestation, hatch time, father cooldown and the default mother cooldown.
    pub reproduction_scale: f64,
    /// Overrides `reproduction_scale` for the post-laying cooldown.
    pub mother_cooldown_scale: Option<f64>,
    pub clutch: ClutchRule,
    pub schooling: SchoolingProfile,
    pub turn_rate_scale: f64,
    pub desired_turn_rate_scale: f64,
    /// Weight of one living fish in the water bioload.
    pub bioload_factor: f64,
    /// Weight of this species' waste in water dirt.
    pub poop_bioload_factor: f64,
    /// When false the fish never schedules digestion poop.
    pub poop_enabled: bool,
    /// Invisible poop bypasses the entity list and goes straight to dirt.
    pub poop_visible: bool,
    pub bottom_dweller: Option<BottomDwellerProfile>,
    /// Seconds between egg snacks.
    pub egg_snack_cooldown_sec: f64,
    /// Both partners must have eaten poop within a window drawn from this range.
    pub mate_requires_recent_poop_sec: Option<[f64; 2]>,
    pub egg_mate_boost: Option<EggMateBoost>,
    /// Fecundity drops as the AZURE_DART population grows.
    pub authority_stressed: bool,
    /// Females lay into nestbrush slots when available.
    pub nests_in_nestbrush: bool,
    /// Females lay at the berry reed when one exists.
    pub lays_near_reed: bool,
    /// Whether egg-eating species may target this species' eggs.
    pub eggs_edible: bool,
    /// Added to hatch chance when a berry reed exists.
    pub reed_hatch_bonus: f64,
    /// Multiplier applied to hatch chance for eggs outside the nestbrush.
    pub unprotected_hatch_multiplier: f64,
}

impl SpeciesProfile {
    #[must_use]
    pub fn lab_minnow() -> Self {
        Self {
            id: SpeciesId::LabMinnow,
            display_name: "Lab Minnow".to_string(),
            diet: vec![DietItem::Pellet],
            adult_size_scale: 1.0,
            speed_scale: 1.0,
            lifespan_scale: 1.0,
            reproduction_scale: 1.0,
            mother_cooldown_scale: None,
            clutch: ClutchRule::Range { min: 2, max: 4 },
            schooling: SchoolingProfile::disabled(),
            turn_rate_scale: 1.0,
            desired_turn_rate_scale: 1.0,
            bioload_factor: 1.0,
            poop_bioload_factor: 1.0,
            poop_enabled: true,
            poop_visible: true,
            bottom_dweller: None,
            egg_snack_cooldown_sec: 0.0,
            mate_requires_recent_poop_sec: None,
            egg_mate_boost: None,
            authority_stressed: true,
            nests_in_nestbrush: true,
            lays_near_reed: false,
            eggs_edible: true,
            reed_hatch_bonus: 0.0,
            unprotected_hatch_multiplier: 0.86,
        }
    }

    #[must_use]
    pub fn azure_dart() -> Self {
        Self {
            id: SpeciesId::AzureDart,
            display_name: "Azure Dart".to_string(),
            diet: vec![DietItem::Fruit],
            adult_size_scale: 0.54,
            speed_scale: 2.0,
            lifespan_scale: 0.5,
            reproduction_scale: 0.5,
            mother_cooldown_scale: None,
            clutch: ClutchRule::Choice {
                sizes: vec![3, 4, 5],
            },
            schooling: SchoolingProfile {
                enabled: true,
                bias_range: [0.62, 0.96],
                solo_window_sec: [1.5, 4.0],
                solo_cooldown_sec: [10.0, 20.0],
                cohesion: 1.2,
                separation: 0.95,
                alignment: 0.95,
                neighbor_radius: 150.0,
                separation_radius: 24.0,
                max_influence: 3.8,
            },
            turn_rate_scale: 1.8,
            desired_turn_rate_scale: 1.7,
            bioload_factor: 0.35,
            poop_bioload_factor: 0.25,
            poop_enabled: true,
            poop_visible: false,
            bottom_dweller: None,
            egg_snack_cooldown_sec: 0.0,
            mate_requires_recent_poop_sec: None,
            egg_mate_boost: None,
            authority_stressed: false,
            nests_in_nestbrush: false,
            lays_near_reed: true,
            eggs_edible: false,
            reed_hatch_bonus: 0.08,
            unprotected_hatch_multiplier: 1.0,
        }
    }

    #[must_use]
    pub fn silt_sifter() -> Self {
        Self {
            id: SpeciesId::SiltSifter,
            display_name: "Silt Sifter".to_string(),
            diet: vec![
                DietItem::Poop,
                DietItem::PelletWhenStarving,
                DietItem::EggWhenStarving,
            ],
            adult_size_scale: 0.86,
            speed_scale: 0.84,
            lifespan_scale: 1.3,
            reproduction_scale: 1.3,
            mother_cooldown_scale: Some(1.5),
            clutch: ClutchRule::Weighted {
                sizes: vec![1, 2, 3],
                weights: vec![0.45, 0.45, 0.1],
            },
            schooling: SchoolingProfile::disabled(),
            turn_rate_scale: 1.05,
            desired_turn_rate_scale: 0.94,
            bioload_factor: 0.92,
            poop_bioload_factor: 0.0,
            poop_enabled: false,
            poop_visible: false,
            bottom_dweller: Some(BottomDwellerProfile {
                band_start01: 0.75,
                band_end01: 1.0,
                steer_bias_strength: 1.9,
                scan_step_x_px: [35.0, 125.0],
                scan_jitter_y_px: 18.0,
                probe_chance: 0.24,
                probe_depth_px: [3.0, 14.0],
            }),
            egg_snack_cooldown_sec: 120.0,
            mate_requires_recent_poop_sec: Some([180.0, 300.0]),
            egg_mate_boost: Some(EggMateBoost {
                window_sec: 300.0,
                multiplier: 3.2,
            }),
            authority_stressed: false,
            nests_in_nestbrush: false,
            lays_near_reed: false,
            eggs_edible: false,
            reed_hatch_bonus: 0.0,
            unprotected_hatch_multiplier: 1.0,
        }
    }

    #[must_use]
    pub fn eats(&self, item: DietItem) -> bool {
        self.diet.contains(&item)
    }

    /// Scale applied to the post-laying mother cooldown.
    #[must_use]
    pub fn cooldown_scale(&self) -> f64 {
        self.mother_cooldown_scale.unwrap_or(self.reproduction_scale)
    }

    /// Whether waste from this species ends up in the entity list.
    #[must_use]
    pub fn poop_is_visible(&self) -> bool {
        self.poop_enabled && self.poop_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_ids_serialize_screaming_snake() {
        let json = serde_json::to_string(&SpeciesId::SiltSifter).unwrap();
        assert_eq!(json, "\"SILT_SIFTER\"");
        let back: SpeciesId = serde_json::from_str("\"AZURE_DART\"").unwrap();
        assert_eq!(back, SpeciesId::AzureDart);
    }

    #[test]
    fn test_diets_differ_by_species() {
        assert!(SpeciesProfile::lab_minnow().eats(DietItem::Pellet));
        assert!(!SpeciesProfile::azure_dart().eats(DietItem::Pellet));
        let silt = SpeciesProfile::silt_sifter();
        assert!(silt.eats(DietItem::Poop));
        assert!(!silt.eats(DietItem::Pellet));
        assert_eq!(silt.cooldown_scale(), 1.5);
    }
}
