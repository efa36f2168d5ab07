//! Infrastructure - Background tasks and process concerns

mod health_prober;
mod shutdown;

pub use health_prober::{HealthProber, ProberConfig};
pub use shutdown::{shutdown_signal, RequestGuard, ShutdownController};
