//! Decode-session orchestration.
//!
//! A session owns the caller-side protocol-version state: the version hint
//! starts at a configured default and is updated from each observed sender
//! announcement, then passed explicitly into every frame decode. The decoder
//! core itself never caches or mutates version state.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::protocols::natnet::{DecodedPacket, NatNetError, ProtocolVersion, decode};
use crate::{PacketRecord, Report, make_report};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet decode error: {0}")]
    Packet(#[from] NatNetError),
}

/// Stateful wrapper around the stateless packet decoder.
///
/// # Examples
/// ```
/// use mocapshark_core::{DecodeSession, ProtocolVersion};
///
/// let session = DecodeSession::new(ProtocolVersion::new(2, 5, 0, 0));
/// assert_eq!(session.version(), ProtocolVersion::new(2, 5, 0, 0));
/// ```
pub struct DecodeSession {
    version: ProtocolVersion,
}

impl DecodeSession {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    /// Current negotiated version: the configured default until a sender
    /// announcement is observed, the announced protocol version afterwards.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn decode(&mut self, payload: &[u8]) -> Result<DecodedPacket, NatNetError> {
        let packet = decode(payload, self.version)?;
        if let DecodedPacket::Sender(sender) = &packet {
            self.version = sender.protocol_version;
        }
        Ok(packet)
    }
}

impl Default for DecodeSession {
    fn default() -> Self {
        Self::new(ProtocolVersion::DEFAULT)
    }
}

/// Decode one dumped datagram file.
pub fn decode_dump_file(path: &Path, version: ProtocolVersion) -> Result<DecodedPacket, SessionError> {
    let data = fs::read(path)?;
    Ok(decode(&data, version)?)
}

/// Decode a series of dumped datagram files into a report, threading the
/// negotiated version across packets in order.
///
/// Per-datagram failures are recorded, not propagated, so one malformed dump
/// does not hide the rest of the series.
pub fn analyze_dump_files<P: AsRef<Path>>(paths: &[P], version: ProtocolVersion) -> Report {
    let mut session = DecodeSession::new(version);
    let packets = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let input = path.display().to_string();
            let outcome = fs::read(path)
                .map_err(SessionError::from)
                .and_then(|data| session.decode(&data).map_err(SessionError::from));
            match outcome {
                Ok(packet) => PacketRecord {
                    input,
                    packet: Some(packet),
                    error: None,
                },
                Err(err) => PacketRecord {
                    input,
                    packet: None,
                    error: Some(err.to_string()),
                },
            }
        })
        .collect();
    make_report(packets)
}
