//! Integration tests for nerium-contrib.

pub mod common;
pub mod formatter_test;
pub mod postgres_test;
pub mod queryable_test;
