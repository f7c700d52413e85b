use bollard::errors::Error as BollardError;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub(crate) type ContainerName = String;

#[derive(Debug, Error)]
pub(crate) enum RuntimeError {
    #[error("container runtime call timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    BollardError(#[from] BollardError),
}

/// A running container as seen by one inventory fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContainerRecord {
    pub(crate) name: ContainerName,
    pub(crate) env: HashMap<String, String>,
}

pub(crate) trait ContainerRuntime: Send + Sync {
    /// Currently running containers with their declared environment.
    fn running_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<ContainerRecord>, RuntimeError>> + Send;

    fn restart(&self, name: &str) -> impl Future<Output = Result<(), RuntimeError>> + Send;
}
