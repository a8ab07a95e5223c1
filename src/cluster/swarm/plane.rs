// ABOUTME: Docker CLI implementation of the control-plane traits.
// ABOUTME: Every call is a typed argv invocation with its own timeout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::cluster::error::CommandError;
use crate::cluster::exec::{self, CommandSpec};
use crate::cluster::traits::sealed::Sealed;
use crate::cluster::traits::{
    ExtractOps, ImageOps, NetworkOps, RegistryAuth, RolloutPolicy, ServiceOps, StackOps, VolumeOps,
};
use crate::types::{ContainerId, ImageRef, NetworkId, ServiceName, StackName};

/// Control plane that talks to a swarm manager through the `docker`
/// binary. Must run on (or with a context pointing at) a manager node.
#[derive(Debug, Clone)]
pub struct SwarmPlane {
    docker: String,
    call_timeout: Duration,
}

impl SwarmPlane {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            docker: "docker".to_string(),
            call_timeout,
        }
    }

    /// Use a different binary name or path (e.g. a wrapper in CI).
    pub fn with_binary(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    fn cmd(&self) -> CommandSpec {
        CommandSpec::new(&self.docker)
    }

    async fn run(&self, spec: CommandSpec) -> Result<exec::CommandOutput, CommandError> {
        exec::run(spec, self.call_timeout).await
    }

    async fn login(&self, auth: &RegistryAuth) -> Result<(), CommandError> {
        let spec = self
            .cmd()
            .args(["login", "--username", auth.username.as_str()])
            .arg("--password-stdin")
            .stdin(auth.password.clone().into_bytes());
        self.run(spec).await?;
        Ok(())
    }
}

impl Sealed for SwarmPlane {}

#[async_trait]
impl ImageOps for SwarmPlane {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), CommandError> {
        if let Some(auth) = auth {
            self.login(auth).await?;
        }
        self.run(self.cmd().arg("pull").arg(reference.to_string()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceOps for SwarmPlane {
    async fn update_service(
        &self,
        service: &ServiceName,
        image: &ImageRef,
        policy: &RolloutPolicy,
        with_registry_auth: bool,
    ) -> Result<String, CommandError> {
        let mut spec = self
            .cmd()
            .args(["service", "update", "--force"])
            .arg("--image")
            .arg(image.to_string())
            .arg("--update-parallelism")
            .arg(policy.parallelism.to_string())
            .arg("--update-delay")
            .arg(format!("{}s", policy.delay.as_secs()))
            .args(["--update-order", policy.order.as_str()]);
        if with_registry_auth {
            spec = spec.arg("--with-registry-auth");
        }
        let output = self.run(spec.arg(service.as_str())).await?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl StackOps for SwarmPlane {
    async fn remove_stack(&self, stack: &StackName) -> Result<(), CommandError> {
        let result = self
            .run(self.cmd().args(["stack", "rm", stack.as_str()]))
            .await;
        match result {
            Ok(_) => Ok(()),
            // Removing an absent stack is a no-op, not a failure.
            Err(CommandError::Exited { ref stderr, .. })
                if stderr.to_lowercase().contains("nothing found in stack") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn deploy_stack(
        &self,
        stack: &StackName,
        dir: &Path,
        definition_file: &str,
        with_registry_auth: bool,
    ) -> Result<String, CommandError> {
        let definition = dir.join(definition_file);
        let mut spec = self
            .cmd()
            .args(["stack", "deploy", "--compose-file"])
            .arg(definition.to_string_lossy().into_owned());
        if with_registry_auth {
            spec = spec.arg("--with-registry-auth");
        }
        let output = self.run(spec.arg(stack.as_str())).await?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl VolumeOps for SwarmPlane {
    async fn list_volumes(&self) -> Result<Vec<String>, CommandError> {
        let output = self
            .run(self.cmd().args(["volume", "ls", "--format", "{{.Name}}"]))
            .await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn remove_volume(&self, name: &str) -> Result<(), CommandError> {
        self.run(self.cmd().args(["volume", "rm", name])).await?;
        Ok(())
    }
}

#[async_trait]
impl NetworkOps for SwarmPlane {
    async fn create_network(&self, name: &str, driver: &str) -> Result<NetworkId, CommandError> {
        let result = self
            .run(
                self.cmd()
                    .args(["network", "create", "--driver", driver, name]),
            )
            .await;
        match result {
            Ok(output) => Ok(NetworkId::new(output.stdout.trim().to_string())),
            Err(CommandError::Exited { ref stderr, .. })
                if stderr.to_lowercase().contains("already exists") =>
            {
                Ok(NetworkId::new(name))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ExtractOps for SwarmPlane {
    async fn extract_files(
        &self,
        image: &ImageRef,
        path_in_image: &str,
        dest: &Path,
    ) -> Result<(), CommandError> {
        // A created-but-never-started container is enough to copy from.
        let created = self
            .run(self.cmd().arg("create").arg(image.to_string()))
            .await?;
        let container = ContainerId::new(created.stdout.trim().to_string());

        let source = format!("{}:{}/.", container.as_str(), path_in_image);
        let copied = self
            .run(
                self.cmd()
                    .arg("cp")
                    .arg(source)
                    .arg(dest.to_string_lossy().into_owned()),
            )
            .await;

        // The scratch container goes away no matter how the copy went.
        let removed = self
            .run(self.cmd().args(["rm", "-f", container.as_str()]))
            .await;
        if let Err(e) = removed {
            tracing::warn!(container = %container, error = %e, "failed to remove extraction container");
        }

        copied.map(|_| ())
    }
}
