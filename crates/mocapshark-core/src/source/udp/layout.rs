use std::net::Ipv4Addr;

/// IANA-registered local-network multicast group used by the streaming
/// server for frame broadcasts.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 42, 99);
/// Default command port of the streaming server.
pub const PORT_COMMAND: u16 = 1510;
/// Default data (frame broadcast) port.
pub const PORT_DATA: u16 = 1511;

pub const SOCKET_RECV_BUFFER_SIZE: usize = 0x0010_0000;
