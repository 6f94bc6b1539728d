use thiserror::Error;

#[derive(Debug, Error)]
pub enum NatNetError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unknown message type: {code}")]
    UnknownMessageType { code: u16 },
    #[error("unimplemented message type: {code}")]
    UnimplementedMessageType { code: u16 },
}
