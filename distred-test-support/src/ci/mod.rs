//! Environment-driven knobs shared by test suites and CI jobs.

pub mod property_test_profile;
