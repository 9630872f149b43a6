//! Request handler
//!
//! One call to [`SolveService::handle`] owns one engine session: open, submit,
//! check, read the model on `sat`, and drop. The whole exchange runs under a
//! deadline; when it elapses the session is dropped (for the Z3 engine that
//! kills the process) and the answer is `unknown`.

use crate::engine::{Engine, Verdict};
use crate::error::SolveError;
use crate::normalize::normalize;
use crate::types::{ConstraintRequest, SolverResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Solves constraint requests against an engine
#[derive(Clone)]
pub struct SolveService {
    engine: Arc<dyn Engine>,
    deadline: Duration,
}

impl SolveService {
    pub fn new(engine: Arc<dyn Engine>, deadline: Duration) -> Self {
        Self { engine, deadline }
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Solve one request in a fresh session
    pub async fn handle(&self, request: &ConstraintRequest) -> Result<SolverResponse, SolveError> {
        if request.constraint.trim().is_empty() {
            return Err(SolveError::EmptyConstraint);
        }

        // A zero deadline disables it, matching z3 without `-t`
        if self.deadline.is_zero() {
            return self.solve(&request.constraint).await;
        }

        match tokio::time::timeout(self.deadline, self.solve(&request.constraint)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    engine = self.engine.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Solver deadline elapsed, answering unknown"
                );
                Ok(SolverResponse::unknown())
            }
        }
    }

    async fn solve(&self, constraint: &str) -> Result<SolverResponse, SolveError> {
        let mut session = self.engine.new_session().await?;
        session.submit(constraint).await?;

        let verdict = session.check().await?;
        debug!(engine = self.engine.name(), %verdict, "Solver verdict");

        let response = match verdict {
            Verdict::Sat => {
                let model = session.model().await?;
                SolverResponse::sat(normalize(&model))
            }
            Verdict::Unsat => SolverResponse::unsat(),
            Verdict::Unknown => SolverResponse::unknown(),
        };
        Ok(response)
    }
}

impl std::fmt::Debug for SolveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveService")
            .field("engine", &self.engine.name())
            .field("deadline", &self.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockEngine, MockOutcome};
    use crate::error::EngineError;
    use crate::types::{ModelEntry, ModelValue};

    const SAT_X5: &str = "(declare-const x Int)(assert (= x 5))";
    const UNSAT_X: &str = "(declare-const x Int)(assert (> x 5))(assert (< x 5))";

    fn service(engine: MockEngine) -> (Arc<MockEngine>, SolveService) {
        let engine = Arc::new(engine);
        let service = SolveService::new(engine.clone(), Duration::from_secs(5));
        (engine, service)
    }

    #[tokio::test]
    async fn test_sat_returns_normalized_model() {
        let (_, service) = service(
            MockEngine::new().with_outcome(SAT_X5, MockOutcome::sat("((define-fun x () Int 5))")),
        );
        let response = service.handle(&ConstraintRequest::new(SAT_X5)).await.unwrap();
        assert_eq!(
            response,
            SolverResponse::sat(vec![ModelEntry::new("x", ModelValue::Int(5))])
        );
    }

    #[tokio::test]
    async fn test_unsat_has_no_model() {
        let (_, service) = service(MockEngine::new().with_outcome(UNSAT_X, MockOutcome::unsat()));
        let response = service.handle(&ConstraintRequest::new(UNSAT_X)).await.unwrap();
        assert_eq!(response.check_result(), Verdict::Unsat);
        assert!(response.model().is_none());
    }

    #[tokio::test]
    async fn test_unknown_is_not_an_error() {
        let (_, service) = service(MockEngine::new().with_outcome("hard", MockOutcome::unknown()));
        let response = service.handle(&ConstraintRequest::new("hard")).await.unwrap();
        assert_eq!(response, SolverResponse::unknown());
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let (_, service) = service(MockEngine::new());
        let err = service
            .handle(&ConstraintRequest::new("not a valid constraint"))
            .await
            .unwrap_err();
        assert!(matches!(err, SolveError::Engine(EngineError::Parse(_))));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_solver_error_is_reported() {
        let (_, service) = service(
            MockEngine::new().with_outcome("c", MockOutcome::SolverError("out of resources".into())),
        );
        let err = service.handle(&ConstraintRequest::new("c")).await.unwrap_err();
        assert!(matches!(err, SolveError::Engine(EngineError::Solver(_))));
        assert_eq!(err.to_string(), "solver error: out of resources");
    }

    #[tokio::test]
    async fn test_empty_constraint_opens_no_session() {
        let (engine, service) = service(MockEngine::new());
        let err = service.handle(&ConstraintRequest::new("  \n\t")).await.unwrap_err();
        assert!(matches!(err, SolveError::EmptyConstraint));
        assert_eq!(engine.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_engine() {
        let (_, service) = service(MockEngine::unavailable());
        let err = service.handle(&ConstraintRequest::new(SAT_X5)).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_every_request_gets_its_own_session() {
        let (engine, service) = service(
            MockEngine::new().with_outcome(SAT_X5, MockOutcome::sat("((define-fun x () Int 5))")),
        );
        let request = ConstraintRequest::new(SAT_X5);
        let first = service.handle(&request).await.unwrap();
        let second = service.handle(&request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.sessions_opened(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_maps_to_unknown() {
        let engine = Arc::new(MockEngine::new().with_outcome("slow", MockOutcome::Hang));
        let service = SolveService::new(engine, Duration::from_millis(250));
        let response = service.handle(&ConstraintRequest::new("slow")).await.unwrap();
        assert_eq!(response, SolverResponse::unknown());
    }

    #[tokio::test]
    async fn test_zero_deadline_is_unbounded() {
        let engine = Arc::new(
            MockEngine::new().with_outcome(SAT_X5, MockOutcome::sat("((define-fun x () Int 5))")),
        );
        let service = SolveService::new(engine, Duration::ZERO);
        let response = service.handle(&ConstraintRequest::new(SAT_X5)).await.unwrap();
        assert_eq!(response.check_result(), Verdict::Sat);
    }

    #[test]
    fn test_debug_shows_engine_name() {
        let service = SolveService::new(Arc::new(MockEngine::new()), Duration::from_secs(1));
        let debug = format!("{:?}", service);
        assert!(debug.contains("mock"));
    }
}
