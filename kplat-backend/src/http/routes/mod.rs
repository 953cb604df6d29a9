//! Route handlers organized by resource

pub mod clubs;
pub mod health;
pub mod items;
