// src/lib.rs
//
// Single-user personal information manager: one profile and its schedule
// items, kept in SQLite.

pub mod config;
pub mod db;

pub use config::{Config, ConfigError};
pub use db::error::{Result, StoreError};
pub use db::monitoring::gather_metrics;
pub use db::profile::{Gender, ProfileFields, ProfileRepo, UserProfile};
pub use db::schedule::{
    Category, ItemFields, ItemFilter, ItemLabel, Priority, ScheduleItem, ScheduleRepo,
    ScheduleStatus,
};
pub use db::Database;
