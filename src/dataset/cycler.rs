//! Round-robin dataset cycler
//!
//! Holds a fixed set of precomputed datasets and hands them out in order,
//! wrapping back to the first after the last.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::generator::generate_datasets;
use super::types::{Dataset, Row};

/// Hands out precomputed datasets round-robin
#[derive(Debug, Clone)]
pub struct DatasetCycler {
    datasets: Vec<Dataset>,
    /// Index of the dataset returned by the next `advance`
    current: usize,
}

impl DatasetCycler {
    /// Create a cycler over the given datasets
    pub fn new(datasets: Vec<Dataset>) -> Self {
        if datasets.is_empty() {
            tracing::warn!("Dataset cycler created with no datasets");
        }
        Self {
            datasets,
            current: 0,
        }
    }

    /// Create a cycler over randomly generated datasets
    pub fn synthetic(count: usize, rows: usize) -> Self {
        Self::new(generate_datasets(count, rows, &mut rand::thread_rng()))
    }

    /// Create a cycler over datasets generated from a fixed seed
    pub fn with_seed(count: usize, rows: usize, seed: u64) -> Self {
        Self::new(generate_datasets(count, rows, &mut StdRng::seed_from_u64(seed)))
    }

    /// Return the current dataset and move on to the next one
    ///
    /// With no datasets configured this returns an empty dataset every time.
    pub fn advance(&mut self) -> Dataset {
        if self.datasets.is_empty() {
            tracing::warn!("No datasets available");
            return Dataset::from(Vec::<Row>::new());
        }

        let dataset = self.datasets[self.current].clone();
        self.current = (self.current + 1) % self.datasets.len();
        dataset
    }

    /// Number of datasets in rotation
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Whether the cycler has no datasets
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Index that the next `advance` will return
    pub fn position(&self) -> usize {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::{Location, Row, Strategy};
    use std::sync::Arc;

    fn dataset(first_id: u32, rows: u32) -> Dataset {
        (first_id..first_id + rows)
            .map(|id| Row::new(id, "Agent 1", Strategy::Momentum, Location::London, 1))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_cycles_in_order() {
        let datasets: Vec<Dataset> = (0..4).map(|i| dataset(i * 10, 3)).collect();
        let mut cycler = DatasetCycler::new(datasets.clone());

        for expected in &datasets {
            let got = cycler.advance();
            assert!(Arc::ptr_eq(&got, expected));
        }

        // Wraps back to the first dataset
        assert!(Arc::ptr_eq(&cycler.advance(), &datasets[0]));
    }

    #[test]
    fn test_two_datasets_three_calls() {
        let d0 = dataset(1, 3);
        let d1 = dataset(100, 3);
        let mut cycler = DatasetCycler::new(vec![d0.clone(), d1.clone()]);

        assert_eq!(cycler.advance(), d0);
        assert_eq!(cycler.advance(), d1);
        assert_eq!(cycler.advance(), d0);
        assert_eq!(cycler.position(), 1);
    }

    #[test]
    fn test_single_dataset_repeats() {
        let d0 = dataset(1, 5);
        let mut cycler = DatasetCycler::new(vec![d0.clone()]);

        for _ in 0..3 {
            assert_eq!(cycler.advance(), d0);
        }
    }

    #[test]
    fn test_empty_cycler_returns_empty() {
        let mut cycler = DatasetCycler::new(Vec::new());
        assert!(cycler.is_empty());

        for _ in 0..3 {
            assert!(cycler.advance().is_empty());
        }
    }

    #[test]
    fn test_seeded_cycler() {
        let mut a = DatasetCycler::with_seed(2, 10, 42);
        let mut b = DatasetCycler::with_seed(2, 10, 42);

        assert_eq!(a.len(), 2);
        assert_eq!(a.advance(), b.advance());
        assert_eq!(a.advance(), b.advance());
    }
}
