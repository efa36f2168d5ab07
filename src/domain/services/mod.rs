//! Domain Services - Pure business logic

mod degradation;
mod failover;
mod route_table;

pub use degradation::{DegradationCatalog, DegradationError};
pub use failover::FailoverPolicy;
pub use route_table::{RouteRule, RouteTable};
