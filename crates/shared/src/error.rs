use thiserror::Error;

use crate::domain::{ListenerId, ListenerSource};

/// A producer registry rejected an add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{registry} registry is closed")]
    RegistryClosed { registry: ListenerSource },
    #[error("listener {} is not registered with the {registry} registry", id.0)]
    UnknownListener {
        registry: ListenerSource,
        id: ListenerId,
    },
}

impl RegistrationError {
    pub fn registry(&self) -> ListenerSource {
        match self {
            Self::RegistryClosed { registry } | Self::UnknownListener { registry, .. } => {
                *registry
            }
        }
    }
}
