//! # Masnaa CLI
//!
//! Seeding and maintenance routines used by the `masnaa-cli` binary and by the
//! integration tests.
//!
//! ```ignore
//! use masnaa_cli::seeder::seed_rbac;
//!
//! let report = seed_rbac(&pool).await?;
//! ```

pub mod seeder;
