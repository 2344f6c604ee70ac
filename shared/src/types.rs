use gripsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

/// Which side of the wire a component is running on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

impl HostType {
    pub fn invert(self) -> Self {
        match self {
            HostType::Server => HostType::Client,
            HostType::Client => HostType::Server,
        }
    }
}

impl Serde for HostType {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(matches!(self, HostType::Server));
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(if reader.read_bit()? {
            HostType::Server
        } else {
            HostType::Client
        })
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

/// Stable identifier for one connected operator, valid for the session's
/// lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u16);

impl ParticipantId {
    /// The session host. Participant keys handed to connecting operators
    /// start above this value.
    pub const SERVER: ParticipantId = ParticipantId(0);

    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

/// Stable identifier for one trackable rigid body, valid for the session's
/// lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u16);

impl ObjectId {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

/// Index into the rigid-body arena owned by the physics collaborator.
/// The synchronization core never stores engine object references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Which of an operator's two hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandIndex {
    Left,
    Right,
}

impl HandIndex {
    pub const BOTH: [HandIndex; 2] = [HandIndex::Left, HandIndex::Right];

    pub fn to_index(self) -> usize {
        match self {
            HandIndex::Left => 0,
            HandIndex::Right => 1,
        }
    }
}

/// Globally unique address of one hand within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandKey {
    pub participant: ParticipantId,
    pub index: HandIndex,
}

impl HandKey {
    pub fn new(participant: ParticipantId, index: HandIndex) -> Self {
        Self { participant, index }
    }
}

impl Serde for ParticipantId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        16
    }
}

impl Serde for ObjectId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        16
    }
}

impl Serde for HandIndex {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(matches!(self, HandIndex::Right));
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(if reader.read_bit()? {
            HandIndex::Right
        } else {
            HandIndex::Left
        })
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl Serde for HandKey {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.participant.ser(writer);
        self.index.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            participant: ParticipantId::de(reader)?,
            index: HandIndex::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.participant.bit_length() + self.index.bit_length()
    }
}
