//! Value objects - Immutable objects defined by their attributes

mod attributes;
mod direction;
mod ids;
mod verb;

pub use attributes::Attributes;
pub use direction::{Direction, Exits};
pub use ids::*;
pub use verb::Verb;
