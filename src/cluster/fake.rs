// ABOUTME: Recording control plane for tests.
// ABOUTME: Logs every call in order and fails on demand per operation.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::CommandError;
use super::traits::sealed::Sealed;
use super::traits::{
    ExtractOps, ImageOps, NetworkOps, RegistryAuth, RolloutPolicy, ServiceOps, StackOps, VolumeOps,
};
use crate::types::{ImageRef, NetworkId, ServiceName, StackName};

/// One recorded control-plane call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlaneCall {
    PullImage { image: String, with_auth: bool },
    UpdateService { service: String, image: String },
    RemoveStack { stack: String },
    ListVolumes,
    RemoveVolume { name: String },
    ExtractFiles { image: String, path: String },
    CreateNetwork { name: String, driver: String },
    DeployStack { stack: String, file: String },
}

/// A control plane that mutates nothing and remembers everything.
#[derive(Default)]
pub(crate) struct FakePlane {
    calls: Mutex<Vec<PlaneCall>>,
    volumes: Vec<String>,
    /// Files written into the destination on extract, as (relative path,
    /// contents). Empty map simulates a silent partial extraction.
    extract_payload: HashMap<String, String>,
    failures: Mutex<HashMap<&'static str, String>>,
}

impl FakePlane {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_volumes<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        volumes: I,
    ) -> Self {
        self.volumes = volumes.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn with_extract_file(mut self, rel_path: &str, contents: &str) -> Self {
        self.extract_payload
            .insert(rel_path.to_string(), contents.to_string());
        self
    }

    /// Make the named operation fail with the given stderr. Operation
    /// names: `pull`, `update`, `remove_stack`, `list_volumes`,
    /// `remove_volume`, `extract`, `create_network`, `deploy_stack`.
    pub(crate) fn fail_on(self, op: &'static str, stderr: &str) -> Self {
        self.failures.lock().insert(op, stderr.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<PlaneCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: PlaneCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, op: &'static str) -> Result<(), CommandError> {
        if let Some(stderr) = self.failures.lock().get(op) {
            return Err(CommandError::Exited {
                program: "docker".to_string(),
                code: 1,
                stderr: stderr.clone(),
            });
        }
        Ok(())
    }
}

impl Sealed for FakePlane {}

#[async_trait]
impl ImageOps for FakePlane {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), CommandError> {
        self.record(PlaneCall::PullImage {
            image: reference.to_string(),
            with_auth: auth.is_some(),
        });
        self.check("pull")
    }
}

#[async_trait]
impl ServiceOps for FakePlane {
    async fn update_service(
        &self,
        service: &ServiceName,
        image: &ImageRef,
        _policy: &RolloutPolicy,
        _with_registry_auth: bool,
    ) -> Result<String, CommandError> {
        self.record(PlaneCall::UpdateService {
            service: service.to_string(),
            image: image.to_string(),
        });
        self.check("update")?;
        Ok(format!("service {service} updated\n"))
    }
}

#[async_trait]
impl StackOps for FakePlane {
    async fn remove_stack(&self, stack: &StackName) -> Result<(), CommandError> {
        self.record(PlaneCall::RemoveStack {
            stack: stack.to_string(),
        });
        self.check("remove_stack")
    }

    async fn deploy_stack(
        &self,
        stack: &StackName,
        _dir: &Path,
        definition_file: &str,
        _with_registry_auth: bool,
    ) -> Result<String, CommandError> {
        self.record(PlaneCall::DeployStack {
            stack: stack.to_string(),
            file: definition_file.to_string(),
        });
        self.check("deploy_stack")?;
        Ok(format!("deploying stack {stack}\n"))
    }
}

#[async_trait]
impl VolumeOps for FakePlane {
    async fn list_volumes(&self) -> Result<Vec<String>, CommandError> {
        self.record(PlaneCall::ListVolumes);
        self.check("list_volumes")?;
        Ok(self.volumes.clone())
    }

    async fn remove_volume(&self, name: &str) -> Result<(), CommandError> {
        self.record(PlaneCall::RemoveVolume {
            name: name.to_string(),
        });
        self.check("remove_volume")
    }
}

#[async_trait]
impl NetworkOps for FakePlane {
    async fn create_network(&self, name: &str, driver: &str) -> Result<NetworkId, CommandError> {
        self.record(PlaneCall::CreateNetwork {
            name: name.to_string(),
            driver: driver.to_string(),
        });
        self.check("create_network")?;
        Ok(NetworkId::new(name))
    }
}

#[async_trait]
impl ExtractOps for FakePlane {
    async fn extract_files(
        &self,
        image: &ImageRef,
        path_in_image: &str,
        dest: &Path,
    ) -> Result<(), CommandError> {
        self.record(PlaneCall::ExtractFiles {
            image: image.to_string(),
            path: path_in_image.to_string(),
        });
        self.check("extract")?;
        for (rel, contents) in &self.extract_payload {
            let target = dest.join(rel);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).expect("fake extract mkdir");
            }
            std::fs::write(&target, contents).expect("fake extract write");
        }
        Ok(())
    }
}
