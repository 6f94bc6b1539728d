use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};
use time::OffsetDateTime;

use super::error::UdpSourceError;
use super::layout;

/// Bind a data socket and join the frame-broadcast multicast group on the
/// given interface.
pub fn bind_data_socket(
    iface: Ipv4Addr,
    group: Ipv4Addr,
    port: u16,
) -> Result<UdpSocket, UdpSourceError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket
        .set_reuse_address(true)
        .map_err(|e| UdpSourceError::Socket {
            context: "set reuse address",
            message: e.to_string(),
        })?;
    socket
        .set_recv_buffer_size(layout::SOCKET_RECV_BUFFER_SIZE)
        .map_err(|e| UdpSourceError::Socket {
            context: "set receive buffer",
            message: e.to_string(),
        })?;
    socket
        .bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into())
        .map_err(|e| UdpSourceError::Socket {
            context: "bind",
            message: e.to_string(),
        })?;
    socket
        .join_multicast_v4(&group, &iface)
        .map_err(|e| UdpSourceError::Socket {
            context: "join multicast group",
            message: e.to_string(),
        })?;
    Ok(socket.into())
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_epoch_seconds() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 * 1e-9
}

#[cfg(test)]
mod tests {
    use super::now_epoch_seconds;

    #[test]
    fn epoch_seconds_is_recent() {
        // any wall clock past 2020 will do
        assert!(now_epoch_seconds() > 1_577_836_800.0);
    }
}
