use crate::config::env_map;
use crate::runtime::{ContainerRecord, ContainerRuntime, RuntimeError};
use bollard::Docker;
use bollard::models::{ContainerInspectResponse, ContainerSummary};
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, RestartContainerOptionsBuilder,
};
use futures_util::future::join_all;
use log::{debug, error, info, trace};
use std::collections::HashMap;

pub(crate) struct DockerHandler {
    docker: Docker,
    stop_timeout: i32,
}

impl DockerHandler {
    pub(crate) fn new(stop_timeout: i32) -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            stop_timeout,
        })
    }

    async fn inspect(&self, container: &ContainerSummary) -> Option<ContainerRecord> {
        let id = container.id.as_deref()?;
        let details = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .inspect_err(|e| error!("Error inspecting container {id}: {e}"))
            .ok()?;
        trace!(
            "container details: {}",
            serde_json::to_string_pretty(&details).unwrap_or_default()
        );
        Some(record_from_inspect(id, details))
    }
}

fn record_from_inspect(id: &str, details: ContainerInspectResponse) -> ContainerRecord {
    let name = details
        .name
        .as_deref()
        .map(|name| name.trim_start_matches('/').to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| id.to_string());
    let env = details
        .config
        .and_then(|config| config.env)
        .unwrap_or_default();
    ContainerRecord {
        name,
        env: env_map(env),
    }
}

impl ContainerRuntime for DockerHandler {
    async fn running_containers(&self) -> Result<Vec<ContainerRecord>, RuntimeError> {
        let filters = HashMap::from([("status".to_string(), vec!["running".to_string()])]);
        let options = ListContainersOptions {
            filters: Some(filters),
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        debug!("found {} running containers", containers.len());

        let records = join_all(containers.iter().map(|container| self.inspect(container))).await;
        Ok(records.into_iter().flatten().collect())
    }

    async fn restart(&self, name: &str) -> Result<(), RuntimeError> {
        info!("Restarting container {name}...");
        let options = RestartContainerOptionsBuilder::new()
            .t(self.stop_timeout)
            .build();
        self.docker.restart_container(name, Some(options)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::ContainerConfig;

    #[test]
    fn record_uses_name_without_leading_slash() {
        let details = ContainerInspectResponse {
            name: Some("/svc-a".to_string()),
            config: Some(ContainerConfig {
                env: Some(vec![
                    "RESTART_CONTAINER=true".to_string(),
                    "RESTART_INTERVAL=00:00:05".to_string(),
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let record = record_from_inspect("abc123", details);
        assert_eq!(record.name, "svc-a");
        assert_eq!(record.env.get("RESTART_CONTAINER").unwrap(), "true");
        assert_eq!(record.env.get("RESTART_INTERVAL").unwrap(), "00:00:05");
    }

    #[test]
    fn record_falls_back_to_id() {
        let record = record_from_inspect("abc123", ContainerInspectResponse::default());
        assert_eq!(record.name, "abc123");
        assert!(record.env.is_empty());
    }
}
