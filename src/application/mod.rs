//! Application Layer - Use cases orchestrating the domain

mod router_service;

pub use router_service::RouterService;
