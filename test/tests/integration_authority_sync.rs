//! End-to-end authority arbitration over a live session: two operators,
//! dynamic policy, hand zones meeting and parting.

use gripsync_client::ClientConfig;
use gripsync_server::ServerConfig;
use gripsync_shared::{HandIndex, HostType};
use gripsync_test::helpers::{tracked_targets, SessionHarness};

fn harness() -> SessionHarness {
    let server_config = ServerConfig {
        phase_jitter_s: 0.0,
        ..ServerConfig::default()
    };
    SessionHarness::new(server_config, ClientConfig::default(), 2)
}

fn feed_tracked(harness: &mut SessionHarness) {
    let x = harness.now_s as f32;
    for endpoint in &mut harness.clients {
        for index in HandIndex::BOTH {
            endpoint.client.set_tracked_targets(index, tracked_targets(x));
        }
    }
}

/// After a full step both sides have drained everything in flight, so a
/// hand the server claims for itself must not still be claimed by its
/// owning client.
fn assert_no_double_authority(harness: &SessionHarness) {
    for (client_index, endpoint) in harness.clients.iter().enumerate() {
        for index in HandIndex::BOTH {
            let hand = harness.hand(client_index, index);
            let server_view = harness.server.authority(hand).unwrap();
            let client_view = endpoint.client.hand_authority(index);
            assert!(
                !(server_view == HostType::Server && client_view == HostType::Client),
                "both sides claim {hand:?}: server={server_view:?} client={client_view:?}"
            );
        }
    }
}

#[test]
fn hands_start_under_client_authority() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness();

    for _ in 0..5 {
        feed_tracked(&mut harness);
        harness.step();
        assert_no_double_authority(&harness);
    }

    for client_index in 0..2 {
        for index in HandIndex::BOTH {
            let hand = harness.hand(client_index, index);
            assert_eq!(harness.server.authority(hand), Some(HostType::Client));
            assert_eq!(
                harness.clients[client_index].client.hand_authority(index),
                HostType::Client
            );
        }
    }
}

#[test]
fn contested_hands_escalate_and_revert_without_double_authority() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness();
    let a = harness.hand(0, HandIndex::Right);
    let b = harness.hand(1, HandIndex::Left);

    for _ in 0..5 {
        feed_tracked(&mut harness);
        harness.step();
    }

    // the two hands' zones meet
    harness.server.hand_zone_event(a, b, true);
    harness.server.hand_zone_event(b, a, true);

    feed_tracked(&mut harness);
    harness.step();
    assert_no_double_authority(&harness);

    assert_eq!(harness.server.authority(a), Some(HostType::Server));
    assert_eq!(harness.server.authority(b), Some(HostType::Server));
    assert_eq!(
        harness.clients[0].client.hand_authority(HandIndex::Right),
        HostType::Server
    );
    assert_eq!(
        harness.clients[1].client.hand_authority(HandIndex::Left),
        HostType::Server
    );

    // uninvolved hands are untouched
    assert_eq!(
        harness.server.authority(harness.hand(0, HandIndex::Left)),
        Some(HostType::Client)
    );

    // while escalated, the owners keep driving their hands through the
    // server: targets flow up and the server applies them
    for _ in 0..10 {
        feed_tracked(&mut harness);
        harness.step();
        assert_no_double_authority(&harness);
    }
    assert!(harness.server_bodies.driven_targets(a).is_some());
    assert!(harness.server_bodies.driven_targets(b).is_some());

    // the zones part again
    harness.server.hand_zone_event(a, b, false);
    harness.server.hand_zone_event(b, a, false);

    feed_tracked(&mut harness);
    harness.step();
    assert_no_double_authority(&harness);

    assert_eq!(harness.server.authority(a), Some(HostType::Client));
    assert_eq!(harness.server.authority(b), Some(HostType::Client));
    assert_eq!(
        harness.clients[0].client.hand_authority(HandIndex::Right),
        HostType::Client
    );
    assert_eq!(
        harness.clients[1].client.hand_authority(HandIndex::Left),
        HostType::Client
    );

    for _ in 0..10 {
        feed_tracked(&mut harness);
        harness.step();
        assert_no_double_authority(&harness);
    }
}

#[test]
fn server_never_drives_an_uncontested_hand() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness();
    let hand = harness.hand(0, HandIndex::Left);

    for _ in 0..30 {
        feed_tracked(&mut harness);
        harness.step();
    }

    assert!(harness.server_bodies.driven_targets(hand).is_none());
}
