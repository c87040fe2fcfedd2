//! Shared fixtures for the spatia integration tests.

pub mod test_util;
