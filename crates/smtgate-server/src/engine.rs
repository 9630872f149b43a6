//! Solver service initialization
//!
//! Turns the `solver` section of [`ServerConfig`] into a [`SolveService`]
//! backed by a Z3 process per request.

use crate::config::ServerConfig;
use smtgate_core::{SolveService, Z3Engine};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the solve service from configuration
///
/// The binary is not probed here; a missing solver surfaces as
/// `503 Solver unavailable` on the first request, so the server can start
/// before z3 is installed.
pub fn init_service(config: &ServerConfig) -> SolveService {
    let z3 = config.solver.z3_config();
    if z3.timeout_ms == 0 {
        warn!("solver.timeout_ms is 0, solve requests have no deadline");
    }
    info!(
        binary = %z3.binary.display(),
        timeout_ms = z3.timeout_ms,
        args = ?z3.args,
        "Configured z3 engine"
    );

    SolveService::new(Arc::new(Z3Engine::new(z3)), config.solver.deadline())
}
