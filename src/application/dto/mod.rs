//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP adapter can
//! serialize/deserialize without reaching into service internals.

mod action_record;
mod dungeon;

pub use action_record::*;
pub use dungeon::*;
