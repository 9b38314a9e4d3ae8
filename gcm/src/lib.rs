//! Wiring shell: builds the in-process fleet a topology describes,
//! constructs one `ExchangeEngine`/`StepCoordinator` per rank, and
//! drives a fixed number of demonstration steps. No numerical kernel,
//! mesh loader, or rheology model lives here -- those are external
//! collaborators this crate only ever calls through the exchange
//! core's public API.

use gcm_collision::BruteForceCollisionDetector;
use gcm_config::FleetConfig;
use gcm_exchange::{ExchangeEngine, StepCoordinator};
use gcm_mesh::{Mesh, MeshSet};
use gcm_net::InProcessTransport;
use std::sync::Arc;
use tracing::info;

/// Runs `steps` rounds of outline/node sync plus a tau reduction on
/// every simulated rank, in its own thread, sharing one in-process
/// transport fleet. Returns the final reduced tau observed by the
/// rank singled out by `report_rank` for the caller to print.
pub fn run_demo(config: &FleetConfig, steps: usize, report_rank: u32) -> gcm_base::Result<f32> {
    let world_size = config.world_size();
    if report_rank as usize >= world_size {
        return Err(gcm_base::err(format!(
            "rank {report_rank} is out of range for a fleet of size {world_size}"
        )));
    }

    let fleet = InProcessTransport::fleet(world_size);
    let reported = std::sync::Mutex::new(None);

    std::thread::scope(|scope| -> gcm_base::Result<()> {
        let mut handles = Vec::new();
        for transport in &fleet {
            let transport: Arc<InProcessTransport> = transport.clone();
            let rank = transport.rank().0;
            let zone_map = config.zone_map();
            let reported = &reported;
            handles.push(scope.spawn(move || -> gcm_base::Result<()> {
                let mut meshes = MeshSet::new();
                for zone in zone_map.zones() {
                    meshes.insert(Mesh::new(zone));
                }

                let engine = ExchangeEngine::new(
                    zone_map,
                    transport.clone(),
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )?;
                let coordinator = StepCoordinator::new(transport.clone());

                let mut local_tau = 1.0f32;
                for step in 0..steps {
                    engine.sync_outlines(&mut meshes)?;
                    engine.sync_nodes(&mut meshes)?;
                    local_tau = coordinator.reduce_max_admissible_tau(local_tau);
                    info!(target: "gcm", rank, step, local_tau, "demo step complete");
                }

                if rank == report_rank {
                    *reported.lock().unwrap() = Some(local_tau);
                }
                Ok(())
            }));
        }
        for handle in handles {
            handle.join().map_err(|_| gcm_base::err("rank thread panicked"))??;
        }
        Ok(())
    })?;

    reported
        .into_inner()
        .unwrap()
        .ok_or_else(|| gcm_base::err("report rank never ran"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn demo_runs_to_completion_and_reports_a_tau() {
        let config = FleetConfig::from_str("zone_ranks = [0, 1]").unwrap();
        let tau = run_demo(&config, 2, 0).unwrap();
        assert_eq!(tau, 1.0);
    }

    #[test]
    fn rejects_an_out_of_range_report_rank() {
        let config = FleetConfig::from_str("zone_ranks = [0, 1]").unwrap();
        assert!(run_demo(&config, 1, 5).is_err());
    }
}
