// ABOUTME: Resolves a stack definition directory from git or from an image.
// ABOUTME: Verifies the expected definition file exists before handing it over.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use crate::cluster::exec::{self, CommandSpec};
use crate::cluster::ExtractOps;
use crate::registry::DefinitionSource;
use crate::types::{ImageRef, UnitId};

use super::error::PipelineError;
use super::stage::PipelineStage;

const STAGE: PipelineStage = PipelineStage::FetchDefinition;

/// A resolved definition directory, owned for the duration of one
/// pipeline run. The scratch variant deletes itself on drop, on every
/// exit path.
#[derive(Debug)]
pub(crate) enum ResolvedDefinition {
    Scratch(TempDir),
    Checkout(PathBuf),
}

impl ResolvedDefinition {
    pub(crate) fn dir(&self) -> &Path {
        match self {
            ResolvedDefinition::Scratch(tmp) => tmp.path(),
            ResolvedDefinition::Checkout(path) => path,
        }
    }
}

/// Fetches stack definitions by source strategy.
pub(crate) struct DefinitionProvider<'a, P: ?Sized> {
    plane: &'a P,
    state_dir: &'a Path,
    call_timeout: Duration,
}

impl<'a, P> DefinitionProvider<'a, P>
where
    P: ExtractOps + ?Sized,
{
    pub(crate) fn new(plane: &'a P, state_dir: &'a Path, call_timeout: Duration) -> Self {
        Self {
            plane,
            state_dir,
            call_timeout,
        }
    }

    /// Resolve a directory containing `definition_file`, or fail naming
    /// what the fetch actually produced. Silent partial extraction is the
    /// most likely failure of this step, so the check is unconditional.
    pub(crate) async fn fetch(
        &self,
        unit: &UnitId,
        unit_image: &ImageRef,
        source: &DefinitionSource,
        definition_file: &str,
    ) -> Result<ResolvedDefinition, PipelineError> {
        let resolved = match source {
            DefinitionSource::ImageEmbedded { path } => {
                let scratch = TempDir::new().map_err(|e| PipelineError::internal(STAGE, e))?;
                self.plane
                    .extract_files(unit_image, path, scratch.path())
                    .await
                    .map_err(PipelineError::external(STAGE))?;
                ResolvedDefinition::Scratch(scratch)
            }
            DefinitionSource::GitSubtree {
                url,
                branch,
                subtree,
            } => {
                let dir = self.sync_subtree(unit, url, branch, subtree).await?;
                ResolvedDefinition::Checkout(dir)
            }
        };

        verify_definition_present(resolved.dir(), definition_file)?;
        Ok(resolved)
    }

    /// Materialize only `subtree` of the repository into this unit's
    /// fixed checkout under the state dir. First fetch does a sparse,
    /// blobless, depth-1 clone; refreshes pin the checkout to the fetched
    /// branch head.
    async fn sync_subtree(
        &self,
        unit: &UnitId,
        url: &str,
        branch: &str,
        subtree: &str,
    ) -> Result<PathBuf, PipelineError> {
        let checkout = self.state_dir.join("definitions").join(unit.as_str());
        std::fs::create_dir_all(self.state_dir.join("definitions"))
            .map_err(|e| PipelineError::internal(STAGE, e))?;

        if checkout.join(".git").is_dir() {
            self.git(
                CommandSpec::new("git")
                    .args(["fetch", "--depth", "1", "origin", branch])
                    .cwd(&checkout),
            )
            .await?;
            self.git(
                CommandSpec::new("git")
                    .args(["reset", "--hard", "FETCH_HEAD"])
                    .cwd(&checkout),
            )
            .await?;
        } else {
            let target = checkout.to_string_lossy().into_owned();
            self.git(CommandSpec::new("git").args([
                "clone",
                "--depth",
                "1",
                "--filter=blob:none",
                "--sparse",
                "--branch",
                branch,
                url,
                target.as_str(),
            ]))
            .await?;
        }

        // Re-applied on refresh too: the configured subtree may change.
        self.git(
            CommandSpec::new("git")
                .args(["sparse-checkout", "set", subtree])
                .cwd(&checkout),
        )
        .await?;

        Ok(checkout.join(subtree))
    }

    async fn git(&self, spec: CommandSpec) -> Result<(), PipelineError> {
        exec::run(spec, self.call_timeout)
            .await
            .map_err(PipelineError::external(STAGE))?;
        Ok(())
    }
}

fn verify_definition_present(dir: &Path, definition_file: &str) -> Result<(), PipelineError> {
    if dir.join(definition_file).is_file() {
        return Ok(());
    }
    let mut listing: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    listing.sort();
    Err(PipelineError::DefinitionMissing {
        stage: STAGE,
        expected: definition_file.to_string(),
        listing,
    })
}
