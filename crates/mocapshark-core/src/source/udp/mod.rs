//! Live UDP datagram source.
//!
//! This module provides a `DatagramSource` backed by a multicast UDP socket
//! joined to the motion-capture server's data group. It handles socket setup
//! and blocking receives, emitting raw datagram events for the decode
//! session; no decoding happens here.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::UdpDataSource;
