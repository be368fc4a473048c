//! Database migrations for statusdeck
//!
//! Applied in order by [`Migrator`] at startup.

pub use sea_orm_migration::prelude::*;

mod migration;

pub use migration::Migrator;
