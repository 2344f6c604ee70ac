use gripsync_client::{Client, ClientConfig};
use gripsync_server::{Server, ServerConfig};
use gripsync_shared::{HandIndex, HandKey, ParticipantId};

use crate::helpers::{fixtures::resting_state, test_physics::TestPhysics};

/// One operator endpoint plus its private physics arena.
pub struct ClientEndpoint {
    pub participant: ParticipantId,
    pub client: Client,
    pub bodies: TestPhysics,
}

/// A server and a set of connected clients exchanging packets in memory.
///
/// Each [`step`] runs one whole-session simulation tick: the server ticks
/// first, its packets are delivered, then every client ticks and its
/// packets are delivered back. Observations made between steps therefore
/// see both sides after they have drained everything in flight.
///
/// [`step`]: SessionHarness::step
pub struct SessionHarness {
    pub server: Server,
    pub server_bodies: TestPhysics,
    pub clients: Vec<ClientEndpoint>,
    pub now_s: f64,
    pub dt: f64,
}

impl SessionHarness {
    pub fn new(server_config: ServerConfig, client_config: ClientConfig, clients: usize) -> Self {
        let mut harness = Self {
            server: Server::new(server_config),
            server_bodies: TestPhysics::new(),
            clients: Vec::new(),
            now_s: 0.0,
            dt: 1.0 / 90.0,
        };

        for _ in 0..clients {
            let participant = harness.server.connect_participant(harness.now_s);
            let mut endpoint = ClientEndpoint {
                participant,
                client: Client::new(participant, client_config.clone(), harness.now_s),
                bodies: TestPhysics::new(),
            };

            // one body per hand, bound on both sides under the same order
            for index in HandIndex::BOTH {
                let hand = HandKey::new(participant, index);

                let server_handle = harness.server_bodies.add_body(resting_state(0.0));
                harness
                    .server
                    .session_mut()
                    .bind_hand_bodies(hand, vec![server_handle]);

                let client_handle = endpoint.bodies.add_body(resting_state(0.0));
                endpoint
                    .client
                    .session_mut()
                    .bind_hand_bodies(hand, vec![client_handle]);
            }

            harness.clients.push(endpoint);
        }

        harness
    }

    pub fn hand(&self, client_index: usize, index: HandIndex) -> HandKey {
        HandKey::new(self.clients[client_index].participant, index)
    }

    /// Runs one tick across the whole session and counts the packets the
    /// server addressed to each client.
    pub fn step(&mut self) -> usize {
        let outbound = self
            .server
            .tick(self.now_s, self.dt, &mut self.server_bodies);
        let delivered = outbound.len();
        for (recipient, packet) in outbound {
            if let Some(endpoint) = self
                .clients
                .iter_mut()
                .find(|endpoint| endpoint.participant == recipient)
            {
                endpoint
                    .client
                    .receive(&packet)
                    .expect("client failed to decode server packet");
            }
        }

        for endpoint in &mut self.clients {
            let packets = endpoint
                .client
                .tick(self.now_s, self.dt, &mut endpoint.bodies);
            for packet in packets {
                self.server
                    .receive(endpoint.participant, &packet)
                    .expect("server failed to decode client packet");
            }
        }

        self.server_bodies.step(self.dt as f32);
        for endpoint in &mut self.clients {
            endpoint.bodies.step(self.dt as f32);
        }

        self.now_s += self.dt;
        delivered
    }

    pub fn step_n(&mut self, ticks: usize) -> usize {
        let mut delivered = 0;
        for _ in 0..ticks {
            delivered += self.step();
        }
        delivered
    }
}
