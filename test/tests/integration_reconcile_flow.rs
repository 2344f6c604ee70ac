//! End-to-end reconciliation over a live session: state frames crossing
//! the wire, buffered, interpolated, and fed back into a trailing
//! simulation.

use gripsync_client::ClientConfig;
use gripsync_server::ServerConfig;
use gripsync_shared::{AuthorityPolicy, HandIndex, HostType, RigidbodyState, SyncConfig};
use gripsync_test::helpers::{resting_state, tracked_targets, SessionHarness};
use nalgebra::Vector3;

#[test]
fn server_replica_tracks_a_client_simulated_hand() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server_config = ServerConfig {
        phase_jitter_s: 0.0,
        ..ServerConfig::default()
    };
    let mut harness = SessionHarness::new(server_config, ClientConfig::default(), 1);
    let hand = harness.hand(0, HandIndex::Left);

    // the operator's hand moves steadily along +x on their own machine
    let client_handle = harness.clients[0].client.session().hand_bodies(hand)[0];
    let mut moving = resting_state(0.0);
    moving.linear_velocity = Vector3::new(0.3, 0.0, 0.0);
    harness.clients[0].bodies.set_state(client_handle, moving);

    for _ in 0..270 {
        let x = harness.now_s as f32;
        for index in HandIndex::BOTH {
            harness.clients[0]
                .client
                .set_tracked_targets(index, tracked_targets(x));
        }
        harness.step();
    }

    // authority never left the client
    assert_eq!(harness.server.authority(hand), Some(HostType::Client));

    let server_handle = harness.server.session().hand_bodies(hand)[0];
    let client_x = harness.clients[0].bodies.state(client_handle).position.x;
    let server_x = harness.server_bodies.state(server_handle).position.x;

    assert!(client_x > 0.8, "client hand should have moved, at {client_x}");
    assert!(
        (client_x - server_x).abs() < 0.25,
        "server replica at {server_x} should trail the client hand at {client_x}"
    );
    assert!(server_x > 0.4, "server replica never moved: {server_x}");
}

#[test]
fn server_drives_hands_from_relayed_targets_under_always_server() {
    let _ = env_logger::builder().is_test(true).try_init();
    let sync = SyncConfig {
        authority_policy: AuthorityPolicy::AlwaysServer,
        ..SyncConfig::default()
    };
    let server_config = ServerConfig {
        sync: sync.clone(),
        phase_jitter_s: 0.0,
    };
    let client_config = ClientConfig { sync };
    let mut harness = SessionHarness::new(server_config, client_config, 1);
    let hand = harness.hand(0, HandIndex::Left);

    let mut delivered = 0;
    for _ in 0..270 {
        let x = 0.1 * harness.now_s as f32;
        for index in HandIndex::BOTH {
            harness.clients[0]
                .client
                .set_tracked_targets(index, tracked_targets(x));
        }
        delivered += harness.step();
    }

    // both sides agree the server owns the hand, with no flip ever needed
    assert_eq!(harness.server.authority(hand), Some(HostType::Server));
    assert_eq!(
        harness.clients[0].client.hand_authority(HandIndex::Left),
        HostType::Server
    );

    // the server has been driving the hand with the operator's tracked
    // pose, a buffer-duration behind
    let tracked_x = 0.1 * harness.now_s as f32;
    let driven = harness
        .server_bodies
        .driven_targets(hand)
        .expect("server never drove the hand");
    assert!(driven.root_position.x > tracked_x - 0.2);
    assert!(driven.root_position.x <= tracked_x + 1.0e-3);

    // and it broadcast authoritative state downward the whole time
    assert!(
        delivered >= 30,
        "expected a steady stream of state packets, saw {delivered}"
    );
}

#[test]
fn observers_follow_a_relayed_hand_through_replicas() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server_config = ServerConfig {
        phase_jitter_s: 0.0,
        ..ServerConfig::default()
    };
    let mut harness = SessionHarness::new(server_config, ClientConfig::default(), 2);
    let hand = harness.hand(0, HandIndex::Left);

    // the second operator observes the first one's left hand
    let replica_handle = harness.clients[1].bodies.add_body(resting_state(0.0));
    harness.clients[1]
        .client
        .session_mut()
        .bind_hand_bodies(hand, vec![replica_handle]);
    harness.clients[1].client.register_remote_hand(hand, 0.0);

    let client_handle = harness.clients[0].client.session().hand_bodies(hand)[0];
    let mut moving = resting_state(0.0);
    moving.linear_velocity = Vector3::new(0.3, 0.0, 0.0);
    harness.clients[0].bodies.set_state(client_handle, moving);

    for _ in 0..270 {
        let x = harness.now_s as f32;
        for client_index in 0..2 {
            for index in HandIndex::BOTH {
                harness.clients[client_index]
                    .client
                    .set_tracked_targets(index, tracked_targets(x));
            }
        }
        harness.step();
    }

    let source_x = harness.clients[0].bodies.state(client_handle).position.x;
    let replica_x = harness.clients[1].bodies.state(replica_handle).position.x;

    assert!(source_x > 0.8);
    assert!(
        (source_x - replica_x).abs() < 0.3,
        "replica at {replica_x} should trail the source hand at {source_x}"
    );
}

#[test]
fn malformed_state_frames_never_reach_the_simulation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server_config = ServerConfig {
        phase_jitter_s: 0.0,
        ..ServerConfig::default()
    };
    let mut harness = SessionHarness::new(server_config, ClientConfig::default(), 1);
    let hand = harness.hand(0, HandIndex::Left);

    // poison the client's hand body so its captures carry NaN positions
    let client_handle = harness.clients[0].client.session().hand_bodies(hand)[0];
    let mut poisoned = resting_state(5.0);
    poisoned.position.x = f32::NAN;
    harness.clients[0].bodies.set_state(client_handle, poisoned);

    let server_handle = harness.server.session().hand_bodies(hand)[0];
    let before: RigidbodyState = harness.server_bodies.state(server_handle).clone();

    for _ in 0..90 {
        let x = harness.now_s as f32;
        for index in HandIndex::BOTH {
            harness.clients[0]
                .client
                .set_tracked_targets(index, tracked_targets(x));
        }
        harness.step();
    }

    let after = harness.server_bodies.state(server_handle);
    assert!(after.position.x.is_finite());
    assert_eq!(after.position, before.position);
}
