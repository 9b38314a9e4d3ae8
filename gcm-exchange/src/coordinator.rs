use gcm_net::Transport;
use std::sync::Arc;
use tracing::{debug, info};

/// Global time-step reduction and collective termination. Separate
/// from `ExchangeEngine` because it only ever touches the transport,
/// never a mesh.
pub struct StepCoordinator<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> StepCoordinator<T> {
    pub fn new(transport: Arc<T>) -> Self {
        StepCoordinator { transport }
    }

    /// All-reduces `local_tau` under the MIN operator, preceded by a
    /// barrier for clean phase separation. Idempotent if every rank
    /// passes the same value.
    pub fn reduce_max_admissible_tau(&self, local_tau: f32) -> f32 {
        debug!(target: "gcm::exchange", local_tau, "reduce_max_admissible_tau");
        self.transport.barrier();
        let global_tau = self.transport.all_reduce_min(local_tau);
        debug!(target: "gcm::exchange", global_tau, "reduce_max_admissible_tau: done");
        global_tau
    }

    /// Collective abort: every rank observes process termination
    /// under `code`.
    pub fn terminate(&self, code: i32) -> ! {
        info!(target: "gcm::exchange", code, "terminate");
        self.transport.abort(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_net::InProcessTransport;
    use test_log::test;

    #[test]
    fn reduce_returns_the_fleet_minimum() {
        let fleet = InProcessTransport::fleet(4);
        let inputs = [1.0f32, 0.5, 0.75, 2.0];
        let results: Vec<f32> = std::thread::scope(|scope| {
            let handles: Vec<_> = fleet
                .iter()
                .zip(inputs)
                .map(|(t, tau)| {
                    let t = t.clone();
                    scope.spawn(move || StepCoordinator::new(t).reduce_max_admissible_tau(tau))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|&r| r == 0.5));
    }
}
