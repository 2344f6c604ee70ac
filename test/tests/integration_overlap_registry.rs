//! End-to-end zone overlap accounting: one object passing through three
//! operators' hand zones, exiting in a different order than it entered.

use gripsync_server::{Server, ServerConfig};
use gripsync_shared::{HandIndex, HandKey, HostType, ObjectId, ParticipantId};
use gripsync_test::helpers::{PauseRecorder, TestPhysics};

struct Scenario {
    server: Server,
    bodies: TestPhysics,
    pause: PauseRecorder,
    hands: Vec<HandKey>,
    cup: ObjectId,
    now_s: f64,
}

impl Scenario {
    fn new() -> Self {
        let mut server = Server::new(ServerConfig {
            phase_jitter_s: 0.0,
            ..ServerConfig::default()
        });

        let mut hands = Vec::new();
        for _ in 0..3 {
            let participant = server.connect_participant(0.0);
            hands.push(HandKey::new(participant, HandIndex::Left));
        }
        let cup = server.session_mut().allocate_object(Vec::new());

        Self {
            server,
            bodies: TestPhysics::new(),
            pause: PauseRecorder::new(),
            hands,
            cup,
            now_s: 0.0,
        }
    }

    fn enter(&mut self, hand_index: usize) {
        let hand = self.hands[hand_index];
        self.server
            .object_zone_event(hand, self.cup, true, &mut self.pause);
    }

    fn exit(&mut self, hand_index: usize) {
        let hand = self.hands[hand_index];
        self.server
            .object_zone_event(hand, self.cup, false, &mut self.pause);
    }

    fn tick(&mut self) {
        self.server.tick(self.now_s, 1.0 / 90.0, &mut self.bodies);
        self.now_s += 1.0 / 90.0;
    }

    fn count(&self, hand_index: usize) -> u32 {
        self.server
            .session()
            .registry()
            .overlap_count(&self.cup, self.hands[hand_index].participant)
    }
}

#[test]
fn counts_stay_consistent_across_out_of_order_exits() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scenario = Scenario::new();
    let cup = scenario.cup;

    // enters: p0, p1, p2 — pause fires exactly once, on the first enter
    scenario.enter(0);
    assert!(scenario.pause.is_paused(cup));
    assert_eq!(scenario.pause.events(), &[(cup, true)]);

    scenario.enter(1);
    scenario.enter(2);
    assert_eq!(scenario.pause.events(), &[(cup, true)]);
    assert_eq!(scenario.count(0), 1);
    assert_eq!(scenario.count(1), 1);
    assert_eq!(scenario.count(2), 1);

    // exits in a different order: p1, p0, p2
    scenario.exit(1);
    assert!(scenario.pause.is_paused(cup));
    assert_eq!(scenario.count(1), 0);
    assert!(scenario.server.session().registry().is_tracked(&cup));

    scenario.exit(0);
    assert!(scenario.pause.is_paused(cup));
    assert_eq!(scenario.count(0), 0);

    // the entry disappears exactly when the last holder leaves
    scenario.exit(2);
    assert!(!scenario.pause.is_paused(cup));
    assert!(!scenario.server.session().registry().is_tracked(&cup));
    assert_eq!(scenario.pause.events(), &[(cup, true), (cup, false)]);
}

#[test]
fn shared_objects_escalate_only_the_holders() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scenario = Scenario::new();

    scenario.enter(0);
    scenario.tick();
    // a lone holder is not contested
    assert_eq!(
        scenario.server.authority(scenario.hands[0]),
        Some(HostType::Client)
    );

    scenario.enter(1);
    scenario.tick();
    assert_eq!(
        scenario.server.authority(scenario.hands[0]),
        Some(HostType::Server)
    );
    assert_eq!(
        scenario.server.authority(scenario.hands[1]),
        Some(HostType::Server)
    );
    // the third operator never touched the object
    assert_eq!(
        scenario.server.authority(scenario.hands[2]),
        Some(HostType::Client)
    );

    scenario.exit(0);
    scenario.tick();
    assert_eq!(
        scenario.server.authority(scenario.hands[0]),
        Some(HostType::Client)
    );
    assert_eq!(
        scenario.server.authority(scenario.hands[1]),
        Some(HostType::Client)
    );
}

#[test]
fn redundant_exits_never_drive_counts_negative() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scenario = Scenario::new();
    let cup = scenario.cup;

    scenario.enter(0);
    scenario.exit(0);
    // replayed exit from a glitching collision layer
    scenario.exit(0);

    assert_eq!(scenario.count(0), 0);
    assert!(!scenario.server.session().registry().is_tracked(&cup));
    assert_eq!(scenario.pause.events(), &[(cup, true), (cup, false)]);
}

#[test]
fn disconnect_releases_held_objects() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scenario = Scenario::new();
    let cup = scenario.cup;

    scenario.enter(0);
    scenario.enter(1);

    let leaver: ParticipantId = scenario.hands[1].participant;
    scenario
        .server
        .disconnect_participant(leaver, &mut scenario.pause);
    assert!(
        scenario.pause.is_paused(cup),
        "another participant still holds it"
    );

    let survivor = scenario.hands[0].participant;
    scenario
        .server
        .disconnect_participant(survivor, &mut scenario.pause);
    assert!(!scenario.pause.is_paused(cup));
}
