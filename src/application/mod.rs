//! Application layer - Use cases, ports and typed repositories

pub mod dto;
pub mod errors;
pub mod ports;
pub mod repositories;
pub mod services;
