//! Demand synthesis: aggregate daily counts → concrete backlog items
//!
//! Each day's `DailyDemand` gives counts per priority plus an optional
//! complexity mix. The synthesizer turns those into `Pending` items with
//! counter-derived ids and sampled effort. This is the ONLY consumer of the
//! seeded RNG in the whole engine; everything downstream is deterministic
//! given the synthesized items.
//!
//! # Determinism
//!
//! - Priorities are walked in `Priority::ALL` order (not map order)
//! - Complexity is drawn from a fixed categorical distribution
//! - Effort is drawn uniformly from the complexity's minute band
//! - Ids increment a counter: `ITEM-000001`, `ITEM-000002`, ...
//!
//! Same seed + same demand feed → byte-identical items.

use crate::models::inputs::DailyDemand;
use crate::models::item::{BacklogItem, Complexity, Priority};
use crate::rng::DeterministicRng;
use chrono::Duration;

/// Default complexity mix when the demand entry carries none (or an
/// inconsistent one): 50% simple, 35% moderate, 15% complex.
const DEFAULT_COMPLEXITY_WEIGHTS: [f64; 3] = [0.50, 0.35, 0.15];

/// Turns daily demand aggregates into concrete items.
pub struct DemandSynthesizer {
    /// Next item id counter (1-based in the formatted id)
    next_item_id: usize,
}

impl DemandSynthesizer {
    /// Create a synthesizer whose id counter starts past the highest
    /// `ITEM-` numbered id in `existing`, so synthesized ids never collide
    /// with an initial backlog that uses the same scheme.
    pub fn new(existing: &[BacklogItem]) -> Self {
        let next_item_id = existing
            .iter()
            .filter_map(|i| i.id().strip_prefix("ITEM-"))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        Self { next_item_id }
    }

    /// Synthesize one day's demand into `Pending` items.
    ///
    /// Each item's due date is `demand.date + sla_breach_threshold_days`,
    /// and its source batch is the demand date.
    pub fn synthesize(
        &mut self,
        demand: &DailyDemand,
        sla_breach_threshold_days: u32,
        rng: &mut DeterministicRng,
    ) -> Vec<BacklogItem> {
        let total = demand.total_items();
        let weights = self.complexity_weights(demand, total);
        let due_date = demand.date + Duration::days(i64::from(sla_breach_threshold_days));
        let batch = demand.date.to_string();

        let mut items = Vec::with_capacity(total);

        for priority in Priority::ALL {
            let count = demand
                .new_items_by_priority
                .get(&priority)
                .copied()
                .unwrap_or(0);

            for _ in 0..count {
                let complexity = Complexity::ALL[rng.pick_weighted(&weights)];
                let (min_minutes, max_minutes) = complexity.effort_minutes_range();
                let minutes = rng.range_u32(min_minutes, max_minutes + 1);

                self.next_item_id += 1;
                let id = format!("ITEM-{:06}", self.next_item_id);

                items.push(
                    BacklogItem::new(id, priority, complexity, demand.date, due_date)
                        .with_effort_hours(f64::from(minutes) / 60.0)
                        .with_source_batch(batch.clone()),
                );
            }
        }

        items
    }

    /// Complexity weights for the batch: the demand's own mix when it is
    /// present and consistent with the priority totals, otherwise the
    /// default distribution.
    fn complexity_weights(&self, demand: &DailyDemand, total: usize) -> [f64; 3] {
        let mix_total: usize = demand.new_items_by_complexity.values().sum();
        if mix_total == 0 || mix_total != total {
            return DEFAULT_COMPLEXITY_WEIGHTS;
        }

        let mut weights = [0.0; 3];
        for (i, complexity) in Complexity::ALL.iter().enumerate() {
            weights[i] = demand
                .new_items_by_complexity
                .get(complexity)
                .copied()
                .unwrap_or(0) as f64;
        }
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::ItemStatus;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn demand_with(priorities: &[(Priority, usize)]) -> DailyDemand {
        let mut demand = DailyDemand::empty(date(1));
        for &(p, n) in priorities {
            demand.new_items_by_priority.insert(p, n);
        }
        demand
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let demand = demand_with(&[(Priority::Low, 3), (Priority::Critical, 2)]);

        let mut synth1 = DemandSynthesizer::new(&[]);
        let mut rng1 = DeterministicRng::new(42);
        let items1 = synth1.synthesize(&demand, 2, &mut rng1);

        let mut synth2 = DemandSynthesizer::new(&[]);
        let mut rng2 = DeterministicRng::new(42);
        let items2 = synth2.synthesize(&demand, 2, &mut rng2);

        assert_eq!(items1, items2);
        assert_eq!(items1.len(), 5);
    }

    fn existing(id: &str) -> BacklogItem {
        BacklogItem::new(
            id.to_string(),
            Priority::Low,
            Complexity::Simple,
            date(1),
            date(2),
        )
    }

    #[test]
    fn test_ids_continue_past_initial_backlog() {
        let demand = demand_with(&[(Priority::Medium, 2)]);
        let initial = vec![existing("ITEM-000003"), existing("ITEM-000010")];
        let mut synth = DemandSynthesizer::new(&initial);
        let mut rng = DeterministicRng::new(1);

        let items = synth.synthesize(&demand, 1, &mut rng);
        assert_eq!(items[0].id(), "ITEM-000011");
        assert_eq!(items[1].id(), "ITEM-000012");
    }

    #[test]
    fn test_foreign_id_schemes_do_not_move_the_counter() {
        let demand = demand_with(&[(Priority::Medium, 1)]);
        let initial = vec![existing("SEED-0099"), existing("ticket-7")];
        let mut synth = DemandSynthesizer::new(&initial);
        let mut rng = DeterministicRng::new(1);

        let items = synth.synthesize(&demand, 1, &mut rng);
        assert_eq!(items[0].id(), "ITEM-000001");
    }

    #[test]
    fn test_items_are_pending_with_batch_and_due_date() {
        let demand = demand_with(&[(Priority::High, 1)]);
        let mut synth = DemandSynthesizer::new(&[]);
        let mut rng = DeterministicRng::new(7);

        let items = synth.synthesize(&demand, 3, &mut rng);
        let item = &items[0];

        assert_eq!(item.status(), ItemStatus::Pending);
        assert_eq!(item.priority(), Priority::High);
        assert_eq!(item.created_date(), date(1));
        assert_eq!(item.due_date(), date(4));
        assert_eq!(item.source_batch(), Some("2024-03-01"));
    }

    #[test]
    fn test_effort_within_complexity_band() {
        // Large batch so every complexity shows up.
        let demand = demand_with(&[(Priority::Low, 200)]);
        let mut synth = DemandSynthesizer::new(&[]);
        let mut rng = DeterministicRng::new(42);

        for item in synth.synthesize(&demand, 1, &mut rng) {
            let (min_minutes, max_minutes) = item.complexity().effort_minutes_range();
            let minutes = item.effort_hours() * 60.0;
            assert!(minutes >= f64::from(min_minutes));
            assert!(minutes <= f64::from(max_minutes));
        }
    }

    #[test]
    fn test_explicit_complexity_mix_is_honored() {
        let mut demand = demand_with(&[(Priority::Low, 4)]);
        // All four items complex; mix total matches priority total.
        demand
            .new_items_by_complexity
            .insert(Complexity::Complex, 4);

        let mut synth = DemandSynthesizer::new(&[]);
        let mut rng = DeterministicRng::new(3);

        for item in synth.synthesize(&demand, 1, &mut rng) {
            assert_eq!(item.complexity(), Complexity::Complex);
        }
    }

    #[test]
    fn test_inconsistent_mix_falls_back_to_defaults() {
        let mut demand = demand_with(&[(Priority::Low, 100)]);
        // Mix total (2) disagrees with priority total (100); defaults apply,
        // so simple items must appear despite the complex-only mix.
        demand
            .new_items_by_complexity
            .insert(Complexity::Complex, 2);

        let mut synth = DemandSynthesizer::new(&[]);
        let mut rng = DeterministicRng::new(3);

        let items = synth.synthesize(&demand, 1, &mut rng);
        assert!(items
            .iter()
            .any(|i| i.complexity() == Complexity::Simple));
    }

    #[test]
    fn test_priority_order_is_fixed() {
        let demand = demand_with(&[(Priority::Critical, 1), (Priority::Low, 1)]);
        let mut synth = DemandSynthesizer::new(&[]);
        let mut rng = DeterministicRng::new(9);

        let items = synth.synthesize(&demand, 1, &mut rng);
        // Low is synthesized first regardless of map insertion order.
        assert_eq!(items[0].priority(), Priority::Low);
        assert_eq!(items[1].priority(), Priority::Critical);
    }
}
