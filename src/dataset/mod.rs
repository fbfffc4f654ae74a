//! Synthetic Grid Data
//!
//! - **types**: Row, Strategy, Location, Dataset
//! - **generator**: Random dataset generation
//! - **cycler**: Round-robin rotation over precomputed datasets
//!
//! # Example
//!
//! ```rust
//! use gridpulse::dataset::DatasetCycler;
//!
//! let mut cycler = DatasetCycler::with_seed(2, 3, 7);
//! let first = cycler.advance();
//! let _second = cycler.advance();
//! assert_eq!(cycler.advance(), first);
//! ```

pub mod cycler;
pub mod generator;
pub mod types;

pub use cycler::DatasetCycler;
pub use generator::{generate_dataset, generate_datasets};
pub use types::{Dataset, Location, Row, Strategy};
