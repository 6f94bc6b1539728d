use std::net::{Ipv4Addr, UdpSocket};

use crate::protocols::natnet::layout::MAX_PACKET_SIZE;
use crate::source::{DatagramEvent, DatagramSource, SourceError};

use super::layout;
use super::reader::{bind_data_socket, now_epoch_seconds};

/// Live multicast source delivering one event per received datagram.
pub struct UdpDataSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpDataSource {
    pub fn open(iface: Ipv4Addr, group: Ipv4Addr, port: u16) -> Result<Self, SourceError> {
        let socket = bind_data_socket(iface, group, port).map_err(SourceError::from)?;
        Ok(Self {
            socket,
            buf: vec![0u8; MAX_PACKET_SIZE],
        })
    }

    /// Open on the default group and data port, joining on any interface.
    pub fn open_default() -> Result<Self, SourceError> {
        Self::open(
            Ipv4Addr::UNSPECIFIED,
            layout::MULTICAST_GROUP,
            layout::PORT_DATA,
        )
    }
}

impl DatagramSource for UdpDataSource {
    fn next_datagram(&mut self) -> Result<Option<DatagramEvent>, SourceError> {
        let (len, addr) = self.socket.recv_from(&mut self.buf)?;
        Ok(Some(DatagramEvent {
            ts: Some(now_epoch_seconds()),
            source: Some(addr),
            data: self.buf[..len].to_vec(),
        }))
    }
}
