//! Read-only queries over the live roster and the archive.

use super::World;
use aquarium_data::{EcosystemReport, Fish};

impl World {
    #[must_use]
    pub fn ecosystem_report(&self) -> EcosystemReport {
        let now = self.sim_time_sec;
        let longest = self
            .fish
            .iter()
            .chain(self.archive.values())
            .max_by(|a, b| a.lifetime_sec(now).total_cmp(&b.lifetime_sec(now)));
        EcosystemReport {
            sim_duration_sec: now,
            eggs_laid_count: self.eggs_laid_count,
            births_count: self.births_count,
            deaths_count: self.deaths_count,
            peak_population_count: self.peak_population_count,
            longest_lived_fish_name: longest.map_or_else(|| "Unknown".to_owned(), |f| f.name.clone()),
            grandparent_count: self.grandparent_ids.len(),
            food_amount_consumed_total: self.food_amount_consumed_total,
        }
    }

    /// Every fish ever seen, live or archived, ordered by id.
    #[must_use]
    pub fn fish_inspector_list(&self) -> Vec<&Fish> {
        let mut list: Vec<&Fish> = self.fish.iter().chain(self.archive.values()).collect();
        list.sort_by_key(|f| f.id);
        list
    }

    /// Topmost live-roster fish whose body covers `(x, y)`.
    #[must_use]
    pub fn find_fish_at(&self, x: f64, y: f64) -> Option<&Fish> {
        let point = aquarium_data::Vec2::new(x, y);
        self.fish
            .iter()
            .rev()
            .find(|f| f.position.distance_to(point) <= f.size * 0.8)
    }
}
