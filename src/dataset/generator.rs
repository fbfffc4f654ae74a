//! Synthetic dataset generation
//!
//! Every dataset holds rows `1..=rows` with agents cycling through twenty
//! names and strategy, location and risk drawn uniformly at random.

use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{Dataset, Location, Row, Strategy};

/// Number of distinct agent names
pub const AGENT_POOL: u32 = 20;

/// Exclusive upper bound of the risk score
pub const MAX_RISK: u32 = 100;

/// Generate `count` datasets of `rows` rows each
pub fn generate_datasets<R: Rng + ?Sized>(count: usize, rows: usize, rng: &mut R) -> Vec<Dataset> {
    (0..count).map(|_| generate_dataset(rows, rng)).collect()
}

/// Generate a single dataset of `rows` rows
pub fn generate_dataset<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Dataset {
    (0..rows as u32)
        .map(|j| {
            Row::new(
                j + 1,
                format!("Agent {}", (j % AGENT_POOL) + 1),
                *Strategy::all().choose(rng).unwrap_or(&Strategy::Momentum),
                *Location::all().choose(rng).unwrap_or(&Location::NewYork),
                rng.gen_range(0..MAX_RISK),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let datasets = generate_datasets(3, 1000, &mut rng);

        assert_eq!(datasets.len(), 3);
        for dataset in &datasets {
            assert_eq!(dataset.len(), 1000);
            assert_eq!(dataset[0].id, 1);
            assert_eq!(dataset[999].id, 1000);
            assert!(dataset.iter().all(|r| r.risk < MAX_RISK));
        }
    }

    #[test]
    fn test_agent_names_cycle() {
        let mut rng = StdRng::seed_from_u64(1);
        let dataset = generate_dataset(41, &mut rng);

        assert_eq!(dataset[0].agent, "Agent 1");
        assert_eq!(dataset[19].agent, "Agent 20");
        assert_eq!(dataset[20].agent, "Agent 1");
        assert_eq!(dataset[40].agent, "Agent 1");
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_dataset(50, &mut StdRng::seed_from_u64(99));
        let b = generate_dataset(50, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_rows() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_dataset(0, &mut rng).is_empty());
        assert!(generate_datasets(0, 10, &mut rng).is_empty());
    }
}
