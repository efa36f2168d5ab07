//! Domain Layer - Entities, value objects, ports and pure services

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
