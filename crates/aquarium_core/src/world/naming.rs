use super::World;
use crate::rng::pick_index;
use aquarium_data::Sex;
use std::collections::HashSet;

const FEMALE_NAMES: &[&str] = &[
    "Ada", "Bree", "Coral", "Dahlia", "Esme", "Fern", "Greta", "Hazel", "Iris", "Juno", "Kiki",
    "Luna", "Maris", "Nell", "Opal", "Pearl", "Quilla", "Rosa", "Selka", "Tilly", "Una", "Vera",
    "Wren", "Yara", "Zoe",
];

const MALE_NAMES: &[&str] = &[
    "Arlo", "Bram", "Cosmo", "Dex", "Eli", "Finn", "Gus", "Hugo", "Ike", "Jasper", "Kai", "Leo",
    "Milo", "Nico", "Otto", "Pip", "Quin", "Rory", "Sol", "Theo", "Ugo", "Vik", "Wade", "Yuri",
    "Zane",
];

/// Longest name a user may give a fish.
pub const MAX_NAME_CHARS: usize = 24;

impl World {
    fn used_names(&self, exclude_fish_id: Option<u64>) -> HashSet<String> {
        self.fish
            .iter()
            .filter(|f| Some(f.id) != exclude_fish_id)
            .map(|f| f.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn register_name(&mut self, base: &str) -> String {
        let next = self.name_counts.get(base).copied().unwrap_or(0) + 1;
        self.name_counts.insert(base.to_string(), next);
        if next == 1 {
            base.to_string()
        } else {
            format!("{base} ({next})")
        }
    }

    /// A pool name for `sex`, preferring names nobody has carried yet.
    pub fn assign_default_name(&mut self, sex: Sex) -> String {
        let pool = match sex {
            Sex::Female => FEMALE_NAMES,
            Sex::Male => MALE_NAMES,
        };
        let used = self.used_names(None);
        let unused: Vec<&str> = pool
            .iter()
            .copied()
            .filter(|name| !self.name_counts.contains_key(*name) && !used.contains(*name))
            .collect();
        let pick_from: &[&str] = if unused.is_empty() { pool } else { &unused };
        let chosen = pick_from[pick_index(&mut *self.rng, pick_from.len())];
        self.register_name(chosen)
    }

    /// Trims `desired` and de-duplicates it against the live roster with a
    /// `" (n)"` suffix. Returns `None` for a blank name.
    pub fn make_unique_name(&mut self, desired: &str, exclude_fish_id: Option<u64>) -> Option<String> {
        let normalized: String = desired.trim().chars().take(MAX_NAME_CHARS).collect();
        let normalized = normalized.trim_end().to_string();
        if normalized.is_empty() {
            return None;
        }

        let used = self.used_names(exclude_fish_id);
        if !used.contains(&normalized) {
            let count = self.name_counts.entry(normalized.clone()).or_insert(0);
            *count = (*count).max(1);
            return Some(normalized);
        }

        let mut suffix = (self.name_counts.get(&normalized).copied().unwrap_or(1) + 1).max(2);
        let mut candidate = format!("{normalized} ({suffix})");
        while used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{normalized} ({suffix})");
        }
        self.name_counts.insert(normalized, suffix);
        Some(candidate)
    }

    /// Renames a live fish. A blank name falls back to a pool name.
    pub fn rename_fish(&mut self, fish_id: u64, name: &str) -> bool {
        let Some(index) = self.fish_index(fish_id) else {
            return false;
        };
        let sex = self.fish[index].sex;
        let new_name = match self.make_unique_name(name, Some(fish_id)) {
            Some(name) => name,
            None => self.assign_default_name(sex),
        };
        self.fish[index].name = new_name;
        true
    }

    /// Rebuilds the name counters from the live roster.
    pub(crate) fn rebuild_name_counts(&mut self) {
        self.name_counts.clear();
        for fish in &self.fish {
            let name = fish.name.trim();
            if !name.is_empty() {
                self.name_counts.entry(name.to_string()).or_insert(1);
            }
        }
    }
}
