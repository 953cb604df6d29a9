//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod club;
pub mod item;
pub mod validation;

pub use club::{ClubName, Country, CreateClubRequest, FootballClub, FoundedYear, NewClub};
pub use item::{CreateItemRequest, Item, ItemName, NewItem};
pub use validation::ValidationError;
