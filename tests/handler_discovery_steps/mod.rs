//! Step definitions for handler discovery BDD scenarios.

pub mod then;
