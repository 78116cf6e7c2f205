//! Domain logic for the PMO portfolio service.
//!
//! Pure code only: no database, network, or clock access. Everything that
//! depends on "today" takes the date as an explicit argument.

pub mod csv;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
