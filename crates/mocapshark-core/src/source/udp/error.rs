use thiserror::Error;

#[derive(Debug, Error)]
pub enum UdpSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("socket setup error ({context}): {message}")]
    Socket {
        context: &'static str,
        message: String,
    },
}
