//! Domain layer - Core game rules with no persistence or transport concerns
//!
//! This layer contains:
//! - Entities: dungeon templates, live instances and action history records
//! - Value Objects: typed ids, directions, attribute blocks
//! - Domain Services: command parsing, name matching and combat arithmetic

pub mod entities;
pub mod services;
pub mod value_objects;
