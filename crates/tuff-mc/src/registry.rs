//! Packet registry.
//!
//! Maps `(phase, direction, id)` to a packet [`Schema`], and a schema tag
//! back to its id within a phase.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::codec::RawPacket;
use crate::error::{ProtocolError, Result};
use crate::packets::traits::{Packet, PacketSchema, SchemaId};
use crate::packets::{Handshake, Ping, Pong, StatusRequest, StatusResponse};
use crate::state::{Direction, Phase};

type DecodeFn = fn(&mut Bytes) -> Result<Box<dyn Packet>>;

/// A registry entry: a schema tag plus the factory that decodes it.
#[derive(Clone, Copy)]
pub struct Schema {
    id: SchemaId,
    decode: DecodeFn,
}

impl Schema {
    /// The schema of packet type `P`.
    #[must_use]
    pub fn of<P: PacketSchema>() -> Self {
        Self {
            id: P::SCHEMA,
            decode: decode_boxed::<P>,
        }
    }

    /// The schema tag.
    #[must_use]
    pub const fn id(&self) -> SchemaId {
        self.id
    }

    /// Decode a packet of this schema from its fields.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to decode.
    pub fn decode(&self, buf: &mut Bytes) -> Result<Box<dyn Packet>> {
        (self.decode)(buf)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Schema").field(&self.id).finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schema {}

fn decode_boxed<P: PacketSchema>(buf: &mut Bytes) -> Result<Box<dyn Packet>> {
    Ok(Box::new(P::read(buf)?))
}

/// Bindings between packet ids and schemas, per phase and direction.
///
/// Within one `(phase, direction)` pair an id maps to exactly one schema;
/// registering an id again replaces the previous binding.
#[derive(Debug, Clone, Default)]
pub struct PacketRegistry {
    bindings: HashMap<(Phase, Direction), BTreeMap<i32, Schema>>,
}

impl PacketRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the handshake and status bindings.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_packet::<Handshake>(Phase::Handshaking, Direction::Serverbound, 0x00);

        registry.register_packet::<StatusRequest>(Phase::Status, Direction::Serverbound, 0x00);
        registry.register_packet::<Ping>(Phase::Status, Direction::Serverbound, 0x01);

        registry.register_packet::<StatusResponse>(Phase::Status, Direction::Clientbound, 0x00);
        registry.register_packet::<Pong>(Phase::Status, Direction::Clientbound, 0x01);

        registry
    }

    /// Bind `id` to `schema` in a phase and direction.
    ///
    /// Returns the schema previously bound to that id, if any.
    pub fn register(
        &mut self,
        phase: Phase,
        direction: Direction,
        id: i32,
        schema: Schema,
    ) -> Option<Schema> {
        let previous = self
            .bindings
            .entry((phase, direction))
            .or_default()
            .insert(id, schema);

        if let Some(previous) = previous {
            debug!(
                %phase,
                %direction,
                id,
                old = %previous.id(),
                new = %schema.id(),
                "Replaced packet binding"
            );
        }

        previous
    }

    /// Bind `id` to packet type `P` in a phase and direction.
    pub fn register_packet<P: PacketSchema>(
        &mut self,
        phase: Phase,
        direction: Direction,
        id: i32,
    ) -> Option<Schema> {
        self.register(phase, direction, id, Schema::of::<P>())
    }

    /// The schema bound to `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPacketId`] if nothing is bound.
    pub fn packet_schema(&self, phase: Phase, direction: Direction, id: i32) -> Result<Schema> {
        self.bindings
            .get(&(phase, direction))
            .and_then(|ids| ids.get(&id))
            .copied()
            .ok_or(ProtocolError::InvalidPacketId {
                phase,
                direction,
                id,
            })
    }

    /// The id bound to `schema` in a phase.
    ///
    /// Clientbound bindings are searched before serverbound ones; within a
    /// direction the lowest id wins.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPacketType`] if the schema is unbound.
    pub fn packet_id(&self, phase: Phase, schema: SchemaId) -> Result<i32> {
        [Direction::Clientbound, Direction::Serverbound]
            .into_iter()
            .find_map(|direction| self.packet_id_in(phase, direction, schema))
            .ok_or(ProtocolError::InvalidPacketType { phase, schema })
    }

    /// The id bound to `schema` in one phase and direction.
    #[must_use]
    pub fn packet_id_in(&self, phase: Phase, direction: Direction, schema: SchemaId) -> Option<i32> {
        self.bindings
            .get(&(phase, direction))?
            .iter()
            .find_map(|(id, bound)| (bound.id() == schema).then_some(*id))
    }

    /// Decode a raw packet using the schema bound to its id.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPacketId`] if the id is unbound, or a
    /// field error if decoding fails.
    pub fn decode(&self, phase: Phase, direction: Direction, raw: &RawPacket) -> Result<Box<dyn Packet>> {
        let schema = self.packet_schema(phase, direction, raw.id)?;
        raw.decode(schema)
    }

    /// Encode a packet under the id bound to its schema.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPacketType`] if the schema is unbound,
    /// or a field error if encoding fails.
    pub fn encode(&self, phase: Phase, packet: &dyn Packet) -> Result<RawPacket> {
        let id = self.packet_id(phase, packet.schema())?;
        RawPacket::encode(id, packet)
    }

    /// Iterate over every binding as `(phase, direction, id, schema)`.
    pub fn bindings(&self) -> impl Iterator<Item = (Phase, Direction, i32, Schema)> + '_ {
        self.bindings.iter().flat_map(|(&(phase, direction), ids)| {
            ids.iter()
                .map(move |(&id, &schema)| (phase, direction, id, schema))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::status::{StatusJson, StatusPlayers, StatusVersion};
    use crate::types::{Json, VarInt};

    crate::packet! {
        struct KeepAlive as "keep_alive" {
            id: VarInt,
        }
    }

    #[test]
    fn test_standard_bindings_roundtrip() {
        let registry = PacketRegistry::standard();

        let mut count = 0;
        for (phase, direction, id, schema) in registry.bindings() {
            assert_eq!(registry.packet_schema(phase, direction, id).unwrap(), schema);
            assert_eq!(registry.packet_id_in(phase, direction, schema.id()), Some(id));
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_reverse_lookup_uses_phase() {
        let registry = PacketRegistry::standard();

        assert_eq!(registry.packet_id(Phase::Status, Pong::SCHEMA).unwrap(), 0x01);
        assert_eq!(registry.packet_id(Phase::Status, Ping::SCHEMA).unwrap(), 0x01);
        assert_eq!(
            registry.packet_id(Phase::Handshaking, Handshake::SCHEMA).unwrap(),
            0x00
        );
        assert!(matches!(
            registry.packet_id(Phase::Handshaking, Pong::SCHEMA),
            Err(ProtocolError::InvalidPacketType { phase: Phase::Handshaking, .. })
        ));
    }

    #[test]
    fn test_unregistered_id() {
        let registry = PacketRegistry::standard();

        let result = registry.packet_schema(Phase::Status, Direction::Serverbound, 0x7f);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidPacketId { id: 0x7f, .. })
        ));

        // Same id, wrong direction for the handshake.
        assert!(
            registry
                .packet_schema(Phase::Handshaking, Direction::Clientbound, 0x00)
                .is_err()
        );

        // No bindings at all for play.
        assert!(
            registry
                .packet_schema(Phase::Play, Direction::Serverbound, 0x00)
                .is_err()
        );
    }

    #[test]
    fn test_unregistered_schema() {
        let registry = PacketRegistry::standard();
        let result = registry.packet_id(Phase::Status, KeepAlive::SCHEMA);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidPacketType { schema, .. }) if schema == KeepAlive::SCHEMA
        ));
    }

    #[test]
    fn test_same_id_differs_by_direction() {
        let registry = PacketRegistry::standard();
        let serverbound = registry
            .packet_schema(Phase::Status, Direction::Serverbound, 0x00)
            .unwrap();
        let clientbound = registry
            .packet_schema(Phase::Status, Direction::Clientbound, 0x00)
            .unwrap();

        assert_eq!(serverbound.id(), StatusRequest::SCHEMA);
        assert_eq!(clientbound.id(), StatusResponse::SCHEMA);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = PacketRegistry::standard();

        let previous = registry.register_packet::<KeepAlive>(Phase::Status, Direction::Serverbound, 0x01);
        assert_eq!(previous, Some(Schema::of::<Ping>()));

        let schema = registry
            .packet_schema(Phase::Status, Direction::Serverbound, 0x01)
            .unwrap();
        assert_eq!(schema.id(), KeepAlive::SCHEMA);
        assert!(registry.packet_id(Phase::Status, Ping::SCHEMA).is_err());
    }

    #[test]
    fn test_register_at_runtime_extends_decoding() {
        let mut registry = PacketRegistry::new();
        registry.register_packet::<KeepAlive>(Phase::Play, Direction::Serverbound, 0x10);

        let raw = RawPacket::encode(0x10, &KeepAlive { id: VarInt(7) }).unwrap();
        let packet = registry
            .decode(Phase::Play, Direction::Serverbound, &raw)
            .unwrap();
        assert_eq!(packet.downcast_ref::<KeepAlive>().unwrap().id, VarInt(7));
    }

    #[test]
    fn test_ambiguous_binding_prefers_clientbound_then_lowest_id() {
        let mut registry = PacketRegistry::new();
        registry.register_packet::<KeepAlive>(Phase::Play, Direction::Serverbound, 0x02);
        registry.register_packet::<KeepAlive>(Phase::Play, Direction::Clientbound, 0x21);
        registry.register_packet::<KeepAlive>(Phase::Play, Direction::Clientbound, 0x20);

        assert_eq!(registry.packet_id(Phase::Play, KeepAlive::SCHEMA).unwrap(), 0x20);
    }

    #[test]
    fn test_encode_decode_status_response() {
        let registry = PacketRegistry::standard();
        let response = StatusResponse {
            response: Json(StatusJson {
                version: StatusVersion {
                    name: "1.15.2".into(),
                    protocol: 578,
                },
                players: StatusPlayers {
                    max: 20,
                    online: 0,
                    sample: Vec::new(),
                },
                description: serde_json::json!({"text": "Test", "bold": true}),
                favicon: None,
            }),
        };

        let raw = registry.encode(Phase::Status, &response).unwrap();
        assert_eq!(raw.id, 0x00);

        let packet = registry
            .decode(Phase::Status, Direction::Clientbound, &raw)
            .unwrap();
        assert_eq!(packet.downcast_ref::<StatusResponse>(), Some(&response));
    }
}
