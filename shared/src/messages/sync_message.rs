use gripsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    world::state::{PhysicsState, PhysicsTargets},
    HandKey, HostType,
};

/// Kinematic drive goals, sent from a non-authoritative driving hand to
/// whichever side is currently authoritative for it.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePhysicsTargets {
    pub time_s: f64,
    pub hand: HandKey,
    pub targets: PhysicsTargets,
}

/// Full authoritative snapshot, sent from the authoritative side to every
/// non-authoritative observer of the hand.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePhysicsState {
    pub time_s: f64,
    pub hand: HandKey,
    pub state: PhysicsState,
}

/// Tells a hand's owner which side is now authoritative for it. Sent by
/// the server after a flip; closes the one-round-trip window in which the
/// owner still acts under the old decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdatePhysicsAuthority {
    pub hand: HandKey,
    pub side: HostType,
}

/// Discriminant written ahead of each message on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Targets,
    State,
    Authority,
}

impl Serde for MessageKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let tag: u8 = match self {
            MessageKind::Targets => 0,
            MessageKind::State => 1,
            MessageKind::Authority => 2,
        };
        writer.write_bit(tag & 0b01 != 0);
        writer.write_bit(tag & 0b10 != 0);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut tag = 0u8;
        if reader.read_bit()? {
            tag |= 0b01;
        }
        if reader.read_bit()? {
            tag |= 0b10;
        }
        match tag {
            0 => Ok(MessageKind::Targets),
            1 => Ok(MessageKind::State),
            2 => Ok(MessageKind::Authority),
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        2
    }
}

/// Any message of the synchronization protocol, tagged for dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncMessage {
    Targets(UpdatePhysicsTargets),
    State(UpdatePhysicsState),
    Authority(UpdatePhysicsAuthority),
}

impl SyncMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            SyncMessage::Targets(_) => MessageKind::Targets,
            SyncMessage::State(_) => MessageKind::State,
            SyncMessage::Authority(_) => MessageKind::Authority,
        }
    }
}

impl Serde for UpdatePhysicsTargets {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.time_s.ser(writer);
        self.hand.ser(writer);
        self.targets.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            time_s: f64::de(reader)?,
            hand: HandKey::de(reader)?,
            targets: PhysicsTargets::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.time_s.bit_length() + self.hand.bit_length() + self.targets.bit_length()
    }
}

impl Serde for UpdatePhysicsState {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.time_s.ser(writer);
        self.hand.ser(writer);
        self.state.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            time_s: f64::de(reader)?,
            hand: HandKey::de(reader)?,
            state: PhysicsState::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.time_s.bit_length() + self.hand.bit_length() + self.state.bit_length()
    }
}

impl Serde for UpdatePhysicsAuthority {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.hand.ser(writer);
        self.side.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            hand: HandKey::de(reader)?,
            side: HostType::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.hand.bit_length() + self.side.bit_length()
    }
}

impl Serde for SyncMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.kind().ser(writer);
        match self {
            SyncMessage::Targets(message) => message.ser(writer),
            SyncMessage::State(message) => message.ser(writer),
            SyncMessage::Authority(message) => message.ser(writer),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match MessageKind::de(reader)? {
            MessageKind::Targets => Ok(SyncMessage::Targets(UpdatePhysicsTargets::de(reader)?)),
            MessageKind::State => Ok(SyncMessage::State(UpdatePhysicsState::de(reader)?)),
            MessageKind::Authority => {
                Ok(SyncMessage::Authority(UpdatePhysicsAuthority::de(reader)?))
            }
        }
    }

    fn bit_length(&self) -> u32 {
        let body = match self {
            SyncMessage::Targets(message) => message.bit_length(),
            SyncMessage::State(message) => message.bit_length(),
            SyncMessage::Authority(message) => message.bit_length(),
        };
        self.kind().bit_length() + body
    }
}
