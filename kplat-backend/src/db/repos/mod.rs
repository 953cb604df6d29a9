//! Repository implementations for database access
//!
//! Each repository checks out one connection per call, with the pool's
//! acquisition timeout, and relies on DB constraints rather than
//! check-then-insert.

pub mod clubs;
pub mod items;

pub use clubs::ClubRepo;
pub use items::ItemRepo;
