use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to spawn scan worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("scan session is stopped")]
    Stopped,
}
