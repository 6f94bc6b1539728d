//! MocapShark core library for motion-capture telemetry decoding.
//!
//! This crate implements the decoding pipeline used by the CLI: datagram
//! sources feed the session layer, which drives the protocol decoder
//! (layout/reader/parser) and collects results into a deterministic report.
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules. Protocol conventions are captured in readers so parsers
//! stay minimal and consistent across versions of the wire format.
//!
//! Invariants:
//! - Decoding is pure and deterministic: identical bytes and version hint
//!   yield structurally equal results.
//! - Version-gated field groups are decoded or skipped wholesale; the read
//!   cursor never desynchronizes.
//! - The decoder never reads outside the provided buffer and never panics on
//!   well-formed-but-unimplemented input.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur de décodage des trames de capture de
//! mouvement : sources -> session -> décodeur de protocole
//! (layout/reader/parser) -> rapport déterministe. Les E/S restent dans
//! `source`, les conventions de protocole dans les `reader`. Garanties :
//! décodage pur et déterministe, groupes de champs conditionnés par version
//! lus ou ignorés en bloc, aucune lecture hors du tampon fourni.
//!
//! # Examples
//! ```
//! use mocapshark_core::{DecodedPacket, ProtocolVersion, decode};
//!
//! // a ping-response datagram: header, 256-byte name block, two versions
//! let mut datagram = Vec::new();
//! datagram.extend_from_slice(&1u16.to_ne_bytes());
//! datagram.extend_from_slice(&0u16.to_ne_bytes());
//! let mut name = [0u8; 256];
//! name[..9].copy_from_slice(b"NatNetLib");
//! datagram.extend_from_slice(&name);
//! datagram.extend_from_slice(&[2, 5, 0, 0]);
//! datagram.extend_from_slice(&[2, 5, 0, 0]);
//!
//! let packet = decode(&datagram, ProtocolVersion::DEFAULT)?;
//! assert!(matches!(packet, DecodedPacket::Sender(_)));
//! # Ok::<(), mocapshark_core::NatNetError>(())
//! ```

use serde::{Deserialize, Serialize};

mod protocols;
mod session;
mod source;

pub use protocols::natnet::layout::MAX_PACKET_SIZE;
pub use protocols::natnet::{
    DecodedPacket, FrameOfData, LabeledMarker, MarkerSet, NatNetError, ParseVersionError, Point3,
    ProtocolVersion, Quaternion, RigidBody, SenderDescriptor, Skeleton, Timecode, decode,
};
pub use session::{DecodeSession, SessionError, analyze_dump_files, decode_dump_file};
pub use source::{
    DatagramEvent, DatagramSource, MULTICAST_GROUP, PORT_COMMAND, PORT_DATA, SourceError,
    UdpDataSource,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Decode report over a series of datagrams, in input order.
///
/// # Examples
/// ```
/// use mocapshark_core::make_report;
///
/// let report = make_report(Vec::new());
/// assert_eq!(report.report_version, mocapshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the wire-protocol version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// One record per input datagram, in input order.
    pub packets: Vec<PacketRecord>,
}

impl Report {
    /// Whether any datagram in the series failed to decode.
    pub fn has_failures(&self) -> bool {
        self.packets.iter().any(|record| record.error.is_some())
    }
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use mocapshark_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "mocapshark".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "mocapshark");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "mocapshark").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Outcome of decoding one input datagram.
///
/// # Examples
/// ```
/// use mocapshark_core::PacketRecord;
///
/// let record = PacketRecord {
///     input: "frame-000.bin".to_string(),
///     packet: None,
///     error: Some("payload too short: need 4 bytes, got 3".to_string()),
/// };
/// assert!(record.packet.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Input path or label as provided to the analyzer.
    pub input: String,
    /// The decoded packet, when decoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet: Option<DecodedPacket>,
    /// The decode failure, when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build a report around the given packet records.
pub fn make_report(packets: Vec<PacketRecord>) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "mocapshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        packets,
    }
}
