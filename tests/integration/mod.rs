//! Integration test modules.

mod challenge_test;
mod economy_test;
mod level_up_test;
mod persistence_test;
mod power_up_test;
mod streak_lifecycle_test;
