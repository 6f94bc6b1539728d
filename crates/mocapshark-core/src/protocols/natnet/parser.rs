use serde::{Deserialize, Serialize};

use super::error::NatNetError;
use super::layout;
use super::reader::NatNetReader;
use super::version::ProtocolVersion;

/// One decoded packet; exactly one variant per decode call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedPacket {
    Sender(SenderDescriptor),
    Frame(FrameOfData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderDescriptor {
    pub app_name: String,
    pub client_version: ProtocolVersion,
    pub protocol_version: ProtocolVersion,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSet {
    pub name: String,
    pub markers: Vec<Point3>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub id: i32,
    pub position: Point3,
    pub orientation: Quaternion,
    pub markers: Vec<Point3>,
    /// Per-marker ids; absent before protocol 2.0, same length as `markers`
    /// otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_ids: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_sizes: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_error: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skeleton {
    pub name: String,
    pub rigid_bodies: Vec<RigidBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledMarker {
    pub id: i32,
    pub position: Point3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

/// SMPTE timecode pair carried at the end of each frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timecode {
    pub code: u32,
    pub subframe: u32,
}

impl Timecode {
    pub fn hours(&self) -> u32 {
        (self.code >> 24) & 0xff
    }

    pub fn minutes(&self) -> u32 {
        (self.code >> 16) & 0xff
    }

    pub fn seconds(&self) -> u32 {
        (self.code >> 8) & 0xff
    }

    pub fn frames(&self) -> u32 {
        self.code & 0xff
    }

    /// Render as `HH:MM:SS:FF.SUB`.
    pub fn stamp(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}:{:02}.{}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.frames(),
            self.subframe
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOfData {
    pub frame_number: i32,
    /// Named marker sets in wire order; names are unique within a frame.
    pub marker_sets: Vec<MarkerSet>,
    pub other_markers: Vec<Point3>,
    pub rigid_bodies: Vec<RigidBody>,
    /// Empty below protocol 2.1, where the wire carries no skeleton bytes.
    pub skeletons: Vec<Skeleton>,
    /// Empty below protocol 2.3, where the wire carries no labeled-marker
    /// bytes.
    pub labeled_markers: Vec<LabeledMarker>,
    pub latency: f32,
    pub timecode: Timecode,
    /// Timestamp derived from the timecode pair.
    pub timestamp: String,
}

/// Decode one datagram payload into a typed packet.
///
/// `version` is the caller's current protocol-version hint; it gates the
/// optional field groups of frame payloads. Trailing bytes after the final
/// declared field of a packet are ignored.
pub fn decode(payload: &[u8], version: ProtocolVersion) -> Result<DecodedPacket, NatNetError> {
    let mut reader = NatNetReader::new(payload);
    reader.require_len(layout::PACKET_HEADER_LEN)?;

    let message_type = reader.read_u16()?;
    // Declared payload byte count: informational only, never used to bound
    // reads.
    let _declared_len = reader.read_u16()?;

    match message_type {
        layout::MSG_PING_RESPONSE => Ok(DecodedPacket::Sender(decode_sender(&mut reader)?)),
        layout::MSG_FRAMEOFDATA => Ok(DecodedPacket::Frame(decode_frame(&mut reader, version)?)),
        layout::MSG_PING
        | layout::MSG_REQUEST
        | layout::MSG_RESPONSE
        | layout::MSG_REQUEST_MODELDEF
        | layout::MSG_MODELDEF
        | layout::MSG_REQUEST_FRAMEOFDATA
        | layout::MSG_MESSAGESTRING
        | layout::MSG_UNRECOGNIZED_REQUEST => Err(NatNetError::UnimplementedMessageType {
            code: message_type,
        }),
        code => Err(NatNetError::UnknownMessageType { code }),
    }
}

fn decode_sender(reader: &mut NatNetReader) -> Result<SenderDescriptor, NatNetError> {
    // fixed-layout block, identical across all observed protocol versions
    reader.require_len(layout::SENDER_PAYLOAD_LEN)?;
    let app_name = reader.read_name_block()?;
    let client_version = ProtocolVersion::from_bytes(reader.read_u8_quad()?);
    let protocol_version = ProtocolVersion::from_bytes(reader.read_u8_quad()?);
    Ok(SenderDescriptor {
        app_name,
        client_version,
        protocol_version,
    })
}

fn decode_point3(reader: &mut NatNetReader) -> Result<Point3, NatNetError> {
    Ok(Point3 {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
    })
}

fn decode_quaternion(reader: &mut NatNetReader) -> Result<Quaternion, NatNetError> {
    Ok(Quaternion {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
        w: reader.read_f32()?,
    })
}

fn decode_markers(reader: &mut NatNetReader) -> Result<Vec<Point3>, NatNetError> {
    let count = reader.read_count(layout::POINT3_LEN)?;
    let mut markers = Vec::with_capacity(count);
    for _ in 0..count {
        markers.push(decode_point3(reader)?);
    }
    Ok(markers)
}

fn decode_rigid_body(
    reader: &mut NatNetReader,
    version: ProtocolVersion,
) -> Result<RigidBody, NatNetError> {
    let id = reader.read_i32()?;
    let position = decode_point3(reader)?;
    let orientation = decode_quaternion(reader)?;
    let markers = decode_markers(reader)?;

    // The ids/sizes lengths reuse the marker count just decoded; the wire
    // carries no second count.
    let (marker_ids, marker_sizes, mean_error) =
        if version.at_least(layout::VERSION_RIGID_BODY_METADATA) {
            let mut ids = Vec::with_capacity(markers.len());
            for _ in 0..markers.len() {
                ids.push(reader.read_i32()?);
            }
            let mut sizes = Vec::with_capacity(markers.len());
            for _ in 0..markers.len() {
                sizes.push(reader.read_f32()?);
            }
            (Some(ids), Some(sizes), Some(reader.read_f32()?))
        } else {
            (None, None, None)
        };

    Ok(RigidBody {
        id,
        position,
        orientation,
        markers,
        marker_ids,
        marker_sizes,
        mean_error,
    })
}

fn decode_skeleton(
    reader: &mut NatNetReader,
    version: ProtocolVersion,
) -> Result<Skeleton, NatNetError> {
    let name = reader.read_cstring(layout::MAX_NAME_LEN)?;
    let count = reader.read_count(layout::RIGID_BODY_MIN_LEN)?;
    let mut rigid_bodies = Vec::with_capacity(count);
    for _ in 0..count {
        rigid_bodies.push(decode_rigid_body(reader, version)?);
    }
    Ok(Skeleton { name, rigid_bodies })
}

fn decode_labeled_marker(
    reader: &mut NatNetReader,
    version: ProtocolVersion,
) -> Result<LabeledMarker, NatNetError> {
    let id = reader.read_i32()?;
    let position = decode_point3(reader)?;
    let size = if version.at_least(layout::VERSION_LABELED_MARKERS) {
        Some(reader.read_f32()?)
    } else {
        None
    };
    Ok(LabeledMarker { id, position, size })
}

fn decode_frame(
    reader: &mut NatNetReader,
    version: ProtocolVersion,
) -> Result<FrameOfData, NatNetError> {
    let frame_number = reader.read_i32()?;

    let set_count = reader.read_count(layout::MARKER_SET_MIN_LEN)?;
    let mut marker_sets = Vec::with_capacity(set_count);
    for _ in 0..set_count {
        let name = reader.read_cstring(layout::MAX_NAME_LEN)?;
        let markers = decode_markers(reader)?;
        marker_sets.push(MarkerSet { name, markers });
    }

    let other_markers = decode_markers(reader)?;

    let body_count = reader.read_count(layout::RIGID_BODY_MIN_LEN)?;
    let mut rigid_bodies = Vec::with_capacity(body_count);
    for _ in 0..body_count {
        rigid_bodies.push(decode_rigid_body(reader, version)?);
    }

    // Below their thresholds the gated sections do not exist on the wire, so
    // zero bytes are consumed for them.
    let skeletons = if version.at_least(layout::VERSION_SKELETONS) {
        let count = reader.read_count(layout::SKELETON_MIN_LEN)?;
        let mut skeletons = Vec::with_capacity(count);
        for _ in 0..count {
            skeletons.push(decode_skeleton(reader, version)?);
        }
        skeletons
    } else {
        Vec::new()
    };

    let labeled_markers = if version.at_least(layout::VERSION_LABELED_MARKERS) {
        let count = reader.read_count(layout::LABELED_MARKER_MIN_LEN)?;
        let mut labeled = Vec::with_capacity(count);
        for _ in 0..count {
            labeled.push(decode_labeled_marker(reader, version)?);
        }
        labeled
    } else {
        Vec::new()
    };

    let latency = reader.read_f32()?;
    let timecode = Timecode {
        code: reader.read_u32()?,
        subframe: reader.read_u32()?,
    };
    // End-of-data tag: presence is required, the value is not interpreted.
    reader.read_i32()?;

    let timestamp = timecode.stamp();
    Ok(FrameOfData {
        frame_number,
        marker_sets,
        other_markers,
        rigid_bodies,
        skeletons,
        labeled_markers,
        latency,
        timecode,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::{DecodedPacket, decode};
    use crate::protocols::natnet::error::NatNetError;
    use crate::protocols::natnet::layout;
    use crate::protocols::natnet::version::ProtocolVersion;

    fn push_i32(buf: &mut Vec<u8>, value: i32) {
        buf.extend_from_slice(&value.to_ne_bytes());
    }

    fn push_u32(buf: &mut Vec<u8>, value: u32) {
        buf.extend_from_slice(&value.to_ne_bytes());
    }

    fn push_f32(buf: &mut Vec<u8>, value: f32) {
        buf.extend_from_slice(&value.to_ne_bytes());
    }

    fn push_cstring(buf: &mut Vec<u8>, name: &str) {
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
    }

    fn push_point(buf: &mut Vec<u8>, x: f32, y: f32, z: f32) {
        push_f32(buf, x);
        push_f32(buf, y);
        push_f32(buf, z);
    }

    fn header(message_type: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&message_type.to_ne_bytes());
        buf.extend_from_slice(&0u16.to_ne_bytes());
        buf
    }

    fn sender_payload(name: &str, client: [u8; 4], protocol: [u8; 4]) -> Vec<u8> {
        let mut buf = header(layout::MSG_PING_RESPONSE);
        let mut block = vec![0u8; layout::MAX_NAME_LEN];
        block[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&block);
        buf.extend_from_slice(&client);
        buf.extend_from_slice(&protocol);
        buf
    }

    fn push_rigid_body(buf: &mut Vec<u8>, id: i32, nmarkers: i32, with_metadata: bool) {
        push_i32(buf, id);
        push_point(buf, 0.1, 0.2, 0.3);
        push_f32(buf, 0.0);
        push_f32(buf, 0.0);
        push_f32(buf, 0.0);
        push_f32(buf, 1.0);
        push_i32(buf, nmarkers);
        for i in 0..nmarkers {
            push_point(buf, i as f32, 0.0, 0.0);
        }
        if with_metadata {
            for i in 0..nmarkers {
                push_i32(buf, i + 1);
            }
            for _ in 0..nmarkers {
                push_f32(buf, 0.02);
            }
            push_f32(buf, 0.001);
        }
    }

    fn frame_payload(version: ProtocolVersion) -> Vec<u8> {
        let mut buf = header(layout::MSG_FRAMEOFDATA);
        push_i32(&mut buf, 92881);
        // one marker set with two markers
        push_i32(&mut buf, 1);
        push_cstring(&mut buf, "all");
        push_i32(&mut buf, 2);
        push_point(&mut buf, -0.5, 0.25, 1.0);
        push_point(&mut buf, 0.5, -0.25, 1.5);
        // one unidentified marker
        push_i32(&mut buf, 1);
        push_point(&mut buf, 0.0, 1.0, 2.0);
        // one rigid body with three markers
        push_i32(&mut buf, 1);
        push_rigid_body(
            &mut buf,
            7,
            3,
            version.at_least(layout::VERSION_RIGID_BODY_METADATA),
        );
        if version.at_least(layout::VERSION_SKELETONS) {
            push_i32(&mut buf, 1);
            push_cstring(&mut buf, "subject");
            push_i32(&mut buf, 1);
            push_rigid_body(
                &mut buf,
                8,
                1,
                version.at_least(layout::VERSION_RIGID_BODY_METADATA),
            );
        }
        if version.at_least(layout::VERSION_LABELED_MARKERS) {
            push_i32(&mut buf, 2);
            for id in 1..=2 {
                push_i32(&mut buf, id);
                push_point(&mut buf, 0.1, 0.2, 0.3);
                push_f32(&mut buf, 0.02);
            }
        }
        push_f32(&mut buf, 0.042);
        push_u32(&mut buf, 0x01020304);
        push_u32(&mut buf, 55);
        push_i32(&mut buf, 0);
        buf
    }

    fn decode_frame(buf: &[u8], version: ProtocolVersion) -> super::FrameOfData {
        match decode(buf, version).unwrap() {
            DecodedPacket::Frame(frame) => frame,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_sender_descriptor() {
        let buf = sender_payload("NatNetLib", [2, 5, 0, 0], [2, 5, 0, 0]);
        let packet = decode(&buf, ProtocolVersion::DEFAULT).unwrap();
        let sender = match packet {
            DecodedPacket::Sender(sender) => sender,
            other => panic!("expected sender, got {other:?}"),
        };
        assert_eq!(sender.app_name, "NatNetLib");
        assert_eq!(sender.client_version, ProtocolVersion::new(2, 5, 0, 0));
        assert_eq!(sender.protocol_version, ProtocolVersion::new(2, 5, 0, 0));
    }

    #[test]
    fn sender_ignores_trailing_bytes() {
        let mut buf = sender_payload("Motive", [1, 7, 2, 0], [2, 7, 0, 0]);
        buf.extend_from_slice(&[0xAA; 16]);
        let packet = decode(&buf, ProtocolVersion::DEFAULT).unwrap();
        assert!(matches!(packet, DecodedPacket::Sender(_)));
    }

    #[test]
    fn short_buffer_fails_before_dispatch() {
        let err = decode(&[0u8; 3], ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(
            err,
            NatNetError::TooShort {
                needed: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn ping_is_unimplemented() {
        let buf = header(layout::MSG_PING);
        let err = decode(&buf, ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(
            err,
            NatNetError::UnimplementedMessageType { code: 0 }
        ));
    }

    #[test]
    fn modeldef_is_unimplemented() {
        let buf = header(layout::MSG_MODELDEF);
        let err = decode(&buf, ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(
            err,
            NatNetError::UnimplementedMessageType { code: 5 }
        ));
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let buf = header(42);
        let err = decode(&buf, ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(err, NatNetError::UnknownMessageType { code: 42 }));
    }

    #[test]
    fn decode_frame_at_2_5() {
        let version = ProtocolVersion::new(2, 5, 0, 0);
        let frame = decode_frame(&frame_payload(version), version);

        assert_eq!(frame.frame_number, 92881);
        assert_eq!(frame.marker_sets.len(), 1);
        assert_eq!(frame.marker_sets[0].name, "all");
        assert_eq!(frame.marker_sets[0].markers.len(), 2);
        assert_eq!(frame.marker_sets[0].markers[1].x, 0.5);
        assert_eq!(frame.other_markers.len(), 1);
        assert_eq!(frame.other_markers[0].z, 2.0);

        assert_eq!(frame.rigid_bodies.len(), 1);
        let body = &frame.rigid_bodies[0];
        assert_eq!(body.id, 7);
        assert_eq!(body.orientation.w, 1.0);
        assert_eq!(body.markers.len(), 3);
        assert_eq!(body.marker_ids.as_deref(), Some(&[1, 2, 3][..]));
        assert_eq!(body.marker_sizes.as_ref().map(Vec::len), Some(3));
        assert_eq!(body.mean_error, Some(0.001));

        assert_eq!(frame.skeletons.len(), 1);
        assert_eq!(frame.skeletons[0].name, "subject");
        assert_eq!(frame.skeletons[0].rigid_bodies.len(), 1);
        assert_eq!(frame.skeletons[0].rigid_bodies[0].id, 8);

        assert_eq!(frame.labeled_markers.len(), 2);
        assert_eq!(frame.labeled_markers[0].id, 1);
        assert_eq!(frame.labeled_markers[0].size, Some(0.02));

        assert_eq!(frame.latency, 0.042);
        assert_eq!(frame.timecode.hours(), 1);
        assert_eq!(frame.timecode.minutes(), 2);
        assert_eq!(frame.timecode.seconds(), 3);
        assert_eq!(frame.timecode.frames(), 4);
        assert_eq!(frame.timestamp, "01:02:03:04.55");
    }

    #[test]
    fn decode_frame_below_2_0_leaves_metadata_absent() {
        let version = ProtocolVersion::new(1, 9, 0, 0);
        let frame = decode_frame(&frame_payload(version), version);

        let body = &frame.rigid_bodies[0];
        assert_eq!(body.markers.len(), 3);
        assert!(body.marker_ids.is_none());
        assert!(body.marker_sizes.is_none());
        assert!(body.mean_error.is_none());
        assert!(frame.skeletons.is_empty());
        assert!(frame.labeled_markers.is_empty());
    }

    #[test]
    fn decode_frame_at_2_0_has_metadata_but_no_skeletons() {
        let version = ProtocolVersion::new(2, 0, 0, 0);
        let frame = decode_frame(&frame_payload(version), version);

        assert!(frame.rigid_bodies[0].marker_ids.is_some());
        assert!(frame.skeletons.is_empty());
        assert!(frame.labeled_markers.is_empty());
    }

    #[test]
    fn skeleton_gating_is_monotonic() {
        // bytes that decode at 2.1 must decode identically at any higher
        // version below the next threshold
        let buf = frame_payload(ProtocolVersion::new(2, 1, 0, 0));
        let at_21 = decode_frame(&buf, ProtocolVersion::new(2, 1, 0, 0));
        let at_22 = decode_frame(&buf, ProtocolVersion::new(2, 2, 0, 0));
        assert_eq!(at_21.skeletons.len(), 1);
        assert_eq!(at_22.skeletons.len(), 1);
        assert_eq!(at_21.skeletons[0].name, at_22.skeletons[0].name);
    }

    #[test]
    fn labeled_marker_section_requires_2_3() {
        let buf = frame_payload(ProtocolVersion::new(2, 3, 0, 0));
        let frame = decode_frame(&buf, ProtocolVersion::new(2, 3, 0, 0));
        assert_eq!(frame.labeled_markers.len(), 2);
    }

    #[test]
    fn truncated_frame_is_too_short() {
        let version = ProtocolVersion::new(2, 5, 0, 0);
        let buf = frame_payload(version);
        let err = decode(&buf[..buf.len() - 1], version).unwrap_err();
        assert!(matches!(err, NatNetError::TooShort { .. }));
    }

    #[test]
    fn negative_marker_count_is_too_short() {
        let mut buf = header(layout::MSG_FRAMEOFDATA);
        push_i32(&mut buf, 1);
        push_i32(&mut buf, 1);
        push_cstring(&mut buf, "all");
        push_i32(&mut buf, -5);
        let err = decode(&buf, ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(err, NatNetError::TooShort { .. }));
    }

    #[test]
    fn oversized_set_count_is_too_short() {
        let mut buf = header(layout::MSG_FRAMEOFDATA);
        push_i32(&mut buf, 1);
        push_i32(&mut buf, i32::MAX);
        let err = decode(&buf, ProtocolVersion::DEFAULT).unwrap_err();
        assert!(matches!(err, NatNetError::TooShort { .. }));
    }

    #[test]
    fn decode_is_deterministic() {
        let version = ProtocolVersion::new(2, 5, 0, 0);
        let buf = frame_payload(version);
        let first = serde_json::to_value(decode(&buf, version).unwrap()).unwrap();
        let second = serde_json::to_value(decode(&buf, version).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
