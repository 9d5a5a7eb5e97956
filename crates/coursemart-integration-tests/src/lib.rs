//! Integration test crate for the CourseMart revenue engine.
//!
//! This crate has no library code. It only contains integration tests
//! that drive the store and the revenue engine together, the way the
//! daemon does.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p coursemart-integration-tests
//! ```
