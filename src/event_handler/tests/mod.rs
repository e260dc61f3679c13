//! Unit tests for event handler discovery.
