//! stockpick — sentiment scoring and proportional budget allocation for equities.
//!
//! Hexagonal architecture: scoring and allocation logic in [`domain`], port
//! traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
