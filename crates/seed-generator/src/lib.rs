//! Synthetic row generator for the negocio seeder.
//!
//! This crate provides the [`EntityGenerator`], which produces plausible
//! es_ES-flavoured values for every table of the schema. The generator uses
//! a seeded RNG so the same seed reproduces the same rows.
//!
//! # Architecture
//!
//! ```text
//! IdPools (ids already committed)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ EntityGenerator  │
//! │                  │
//! │  - rng (StdRng)  │
//! │  - now (pinned)  │
//! │  - emails issued │
//! └────────┬─────────┘
//!          │
//!          ▼
//!    EntityRow { table, values }
//! ```
//!
//! # Example
//!
//! ```rust
//! use seed_core::{IdPools, Table};
//! use seed_generator::EntityGenerator;
//!
//! let mut pools = IdPools::new();
//! pools.publish(Table::Zona, vec![1, 2, 3]);
//!
//! let mut generator = EntityGenerator::new(42);
//! let sensor = generator.generate(Table::Sensor, &pools).unwrap();
//! assert_eq!(sensor.values.len(), Table::Sensor.insert_columns().len());
//! ```
//!
//! Foreign keys are only ever sampled from the pools passed in; a table
//! whose parent pool is empty yields [`GeneratorError::EmptyPool`].

pub mod generator;
pub mod generators;

// Re-exports for convenience
pub use generator::{EntityGenerator, GeneratorError};
pub use generators::sample;
