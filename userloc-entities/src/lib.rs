#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

//! # userloc-entities
//!
//! Reusable, agnostic domain entities for grouping users by location.
//!
//! The entities only contain generic functionality that does not reveal any application-specific business logic.

pub mod address;
pub mod geo;
pub mod group;
pub mod key;
pub mod location;
pub mod user;
pub mod viewport;

#[cfg(any(test, feature = "builders"))]
pub mod builders;
