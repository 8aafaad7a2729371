use failsafe::{backoff, failure_policy, Config, StateMachine};
use std::time::Duration;

/// Breaker guarding calls to the record source.
pub type SourceCircuitBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Creates a circuit breaker for record-source calls so a dead MCP server
/// fails fast instead of timing out on every page.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures opens the circuit.
/// - **Backoff**: Exponential from 10s to 60s before a trial call.
///
/// # Example
///
/// ```rust
/// use crm_cleanup_api::circuit_breaker::create_source_circuit_breaker;
/// use failsafe::futures::CircuitBreaker;
///
/// # async fn demo() {
/// let breaker = create_source_circuit_breaker();
/// let result = breaker.call(async { Ok::<u32, ()>(1) }).await;
/// assert!(result.is_ok());
/// # }
/// ```
pub fn create_source_circuit_breaker() -> SourceCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}
