#![cfg(test)]

//! Shared test initialization for unit and integration tests.

pub mod logging;
