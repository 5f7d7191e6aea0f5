//! Feature state for ProsperIA's views.
//!
//! Everything here is local to one user and lives in the shared
//! [`local_store`] under independent keys:
//! - [`GoalTracker`]: monthly income target and amount achieved
//! - [`TaskManager`]: the personal task list
//! - [`ThemePreference`]: light/dark choice
//!
//! [`catalog`] holds the static job and course listings.

pub mod catalog;
mod error;
mod goals;
mod tasks;
mod theme;

pub use catalog::{Catalog, JobListing, LearningResource};
pub use error::{FeatureError, FeatureResult};
pub use goals::{parse_amount, GoalTracker, DEFAULT_MONTHLY_TARGET};
pub use tasks::{Task, TaskManager};
pub use theme::{Theme, ThemePreference};
