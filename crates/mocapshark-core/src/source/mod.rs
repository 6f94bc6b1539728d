mod udp;

pub use udp::UdpDataSource;
pub use udp::layout::{MULTICAST_GROUP, PORT_COMMAND, PORT_DATA};

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DatagramEvent {
    /// Receive time in seconds since the Unix epoch, when known.
    pub ts: Option<f64>,
    pub source: Option<SocketAddr>,
    pub data: Vec<u8>,
}

pub trait DatagramSource {
    fn next_datagram(&mut self) -> Result<Option<DatagramEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("socket error: {0}")]
    Socket(String),
}

impl From<udp::error::UdpSourceError> for SourceError {
    fn from(value: udp::error::UdpSourceError) -> Self {
        match value {
            udp::error::UdpSourceError::Io(err) => SourceError::Io(err),
            udp::error::UdpSourceError::Socket { context, message } => {
                SourceError::Socket(format!("{context}: {message}"))
            }
        }
    }
}
