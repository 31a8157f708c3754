//! Librarian release quality engine
//!
//! Scores release names against user-selectable profiles and decides
//! whether a candidate should replace an existing file.

pub mod config;
pub mod error;
pub mod services;

pub use config::Config;
pub use error::{CatalogError, ConditionError, ProfileError};
