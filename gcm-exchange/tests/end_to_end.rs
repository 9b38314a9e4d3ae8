//! End-to-end exchange scenarios driven over several simulated ranks
//! sharing one `InProcessTransport` fleet.

use gcm_collision::BruteForceCollisionDetector;
use gcm_exchange::{ExchangeEngine, VirtNode, ZoneMap};
use gcm_mesh::{Face, Mesh, MeshSet, Node, Outline, Tetrahedron, ZoneId};
use gcm_net::{InProcessTransport, Rank};
use std::collections::BTreeMap;
use std::sync::Arc;
use test_log::test;

fn two_rank_zone_map() -> ZoneMap {
    ZoneMap::new(vec![Rank(0), Rank(1)])
}

/// Scenario: all pairwise intersections are degenerate. Every remote
/// mesh's border and node vectors must come back empty, with no
/// descriptor ever built for a zero-volume request.
#[test]
fn face_halo_on_empty_intersection_yields_no_geometry() {
    let fleet = InProcessTransport::fleet(2);
    let t0 = fleet[0].clone();
    let t1 = fleet[1].clone();
    let zm0 = two_rank_zone_map();
    let zm1 = two_rank_zone_map();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            let mut meshes = MeshSet::new();
            meshes.insert(Mesh::new(ZoneId(0)));
            meshes.insert(Mesh::new(ZoneId(1)));

            let mut engine =
                ExchangeEngine::new(zm0, t0, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            let mut intersections = BTreeMap::new();
            intersections.insert((ZoneId(0), ZoneId(1)), Outline::degenerate());
            engine
                .sync_faces_in_intersection(&mut meshes, &intersections)
                .unwrap();

            let remote = meshes.get(ZoneId(1)).unwrap();
            assert!(remote.border.is_empty());
            assert!(remote.nodes.is_empty());
        });
        scope.spawn(move || {
            let mut meshes = MeshSet::new();
            meshes.insert(Mesh::new(ZoneId(1)));
            meshes.insert(Mesh::new(ZoneId(0)));

            let mut engine =
                ExchangeEngine::new(zm1, t1, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            // rank 1 services no requests (the only pair's outline is
            // degenerate, so rank 0 never posts one) but still needs
            // to complete the sentinel drain.
            let intersections = BTreeMap::new();
            engine
                .sync_faces_in_intersection(&mut meshes, &intersections)
                .unwrap();
        });
    });
}

/// Scenario: with P ranks, every rank must observe exactly P sentinel
/// headers during a face sync and the drain loop must still
/// terminate when nobody requests anything at all.
#[test]
fn sentinel_drain_completes_with_three_ranks_and_no_requests() {
    let fleet = InProcessTransport::fleet(3);
    let owners = vec![Rank(0), Rank(1), Rank(2)];

    std::thread::scope(|scope| {
        for (rank, transport) in fleet.into_iter().enumerate() {
            let zone_map = ZoneMap::new(owners.clone());
            scope.spawn(move || {
                let mut meshes = MeshSet::new();
                meshes.insert(Mesh::new(ZoneId(rank as u32)));
                let mut engine = ExchangeEngine::new(
                    zone_map,
                    transport,
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )
                .unwrap();
                let intersections = BTreeMap::new();
                engine
                    .sync_faces_in_intersection(&mut meshes, &intersections)
                    .unwrap();
            });
        }
    });
}

/// Scenario: two zones meet at a planar interface; rank 0 requests
/// the tetrahedra incident on the face that borders rank 1's zone,
/// and must receive exactly the tetrahedron rank 1 holds locally.
#[test]
fn tetrahedron_halo_mirrors_the_remote_owners_tetrahedron() {
    let fleet = InProcessTransport::fleet(2);
    let t0 = fleet[0].clone();
    let t1 = fleet[1].clone();
    let zm0 = two_rank_zone_map();
    let zm1 = two_rank_zone_map();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            let mut meshes = MeshSet::new();
            meshes.insert(Mesh::new(ZoneId(0)));
            meshes.insert(Mesh::new(ZoneId(1)));

            let mut engine =
                ExchangeEngine::new(zm0, t0, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            let virt_nodes = [VirtNode {
                target_zone: ZoneId(1),
                face_local_id: 0,
            }];
            engine.sync_tetrs(&mut meshes, &virt_nodes).unwrap();

            let remote = meshes.get(ZoneId(1)).unwrap();
            assert_eq!(remote.tetrs.len(), 1);
            assert_eq!(remote.tetrs[0].vertex_indices, [0, 1, 2, 3]);
            assert_eq!(remote.nodes.len(), 4);
        });
        scope.spawn(move || {
            let mut meshes = MeshSet::new();
            let mut zone1 = Mesh::new(ZoneId(1));
            zone1.nodes = (0..4).map(|i| Node::new_local(i, ZoneId(1), [i as f32; 3])).collect();
            zone1.border = vec![Face {
                local_id: 0,
                vertex_indices: [0, 1, 2],
            }];
            zone1.tetrs = vec![Tetrahedron {
                local_id: 0,
                vertex_indices: [0, 1, 2, 3],
            }];
            zone1.rebuild_adjacency();
            meshes.insert(zone1);
            meshes.insert(Mesh::new(ZoneId(0)));

            let mut engine =
                ExchangeEngine::new(zm1, t1, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            let virt_nodes: [VirtNode; 0] = [];
            engine.sync_tetrs(&mut meshes, &virt_nodes).unwrap();
        });
    });
}

/// Scenario: rank 1 owns two of the zones rank 0 requests tetrahedra
/// from. Both requests share a single fixed response tag on the wire,
/// so the receiver must route each response by the zone id carried in
/// its own header rather than by the order the two requests were
/// sent in -- otherwise a response serviced out of order would land
/// in the wrong mesh.
#[test]
fn tetrahedron_halo_from_one_owner_routes_each_zone_independently() {
    let fleet = InProcessTransport::fleet(2);
    let t0 = fleet[0].clone();
    let t1 = fleet[1].clone();
    let owners = vec![Rank(0), Rank(1), Rank(1)];
    let zm0 = ZoneMap::new(owners.clone());
    let zm1 = ZoneMap::new(owners);

    std::thread::scope(|scope| {
        scope.spawn(move || {
            let mut meshes = MeshSet::new();
            meshes.insert(Mesh::new(ZoneId(0)));
            meshes.insert(Mesh::new(ZoneId(1)));
            meshes.insert(Mesh::new(ZoneId(2)));

            let mut engine =
                ExchangeEngine::new(zm0, t0, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            let virt_nodes = [
                VirtNode {
                    target_zone: ZoneId(1),
                    face_local_id: 0,
                },
                VirtNode {
                    target_zone: ZoneId(2),
                    face_local_id: 0,
                },
            ];
            engine.sync_tetrs(&mut meshes, &virt_nodes).unwrap();

            let zone1 = meshes.get(ZoneId(1)).unwrap();
            assert_eq!(zone1.tetrs.len(), 1);
            assert_eq!(zone1.tetrs[0].local_id, 100);
            assert_eq!(zone1.nodes.len(), 4);
            assert_eq!(zone1.nodes[0].coords, [0.0, 0.0, 0.0]);

            let zone2 = meshes.get(ZoneId(2)).unwrap();
            assert_eq!(zone2.tetrs.len(), 1);
            assert_eq!(zone2.tetrs[0].local_id, 200);
            assert_eq!(zone2.nodes.len(), 4);
            assert_eq!(zone2.nodes[0].coords, [9.0, 9.0, 9.0]);
        });
        scope.spawn(move || {
            let mut meshes = MeshSet::new();

            let mut zone1 = Mesh::new(ZoneId(1));
            zone1.nodes = (0..4).map(|i| Node::new_local(i, ZoneId(1), [i as f32; 3])).collect();
            zone1.border = vec![Face {
                local_id: 0,
                vertex_indices: [0, 1, 2],
            }];
            zone1.tetrs = vec![Tetrahedron {
                local_id: 100,
                vertex_indices: [0, 1, 2, 3],
            }];
            zone1.rebuild_adjacency();
            meshes.insert(zone1);

            let mut zone2 = Mesh::new(ZoneId(2));
            zone2.nodes = (0..4).map(|i| Node::new_local(i, ZoneId(2), [9.0 + i as f32; 3])).collect();
            zone2.border = vec![Face {
                local_id: 0,
                vertex_indices: [0, 1, 2],
            }];
            zone2.tetrs = vec![Tetrahedron {
                local_id: 200,
                vertex_indices: [0, 1, 2, 3],
            }];
            zone2.rebuild_adjacency();
            meshes.insert(zone2);

            meshes.insert(Mesh::new(ZoneId(0)));

            let mut engine =
                ExchangeEngine::new(zm1, t1, Arc::new(BruteForceCollisionDetector), &meshes)
                    .unwrap();

            let virt_nodes: [VirtNode; 0] = [];
            engine.sync_tetrs(&mut meshes, &virt_nodes).unwrap();
        });
    });
}
