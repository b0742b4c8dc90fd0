use shared::error::RegistrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("failed to register event watcher: {0}")]
    Register(#[from] RegistrationError),
    #[error("failed to unregister event watcher from {} registries", failures.len())]
    Unregister { failures: Vec<RegistrationError> },
    #[error("failed to spawn dispatcher thread: {0}")]
    SpawnDispatcher(#[source] std::io::Error),
}
