//! Database query functions organized by domain.

pub mod catalog;
pub mod enrollments;
pub mod orders;
pub mod settings;
pub mod users;
