//! Requirement provider backed by git mirrors and binary-project downloads

use super::provider::{ProviderError, ProviderFuture, RequirementProvider, Requirements};
use crate::cartfile::{
    BinaryProject, CARTFILE_PATH, Cartfile, Dependency, PinnedVersion, sort_descending,
};
use crate::sync::{MirrorError, ProjectEvent, RepositoryMirror, Synchronizer};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use url::Url;

pub struct LiveProvider {
    synchronizer: Synchronizer,
    client: Client,
    /// Binary-project definitions, downloaded once per run
    binary_projects: RwLock<HashMap<Dependency, BinaryProject>>,
}

impl LiveProvider {
    pub fn new(synchronizer: Synchronizer, client: Client) -> Self {
        Self {
            synchronizer,
            client,
            binary_projects: RwLock::new(HashMap::new()),
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    fn mirror(&self) -> &Arc<dyn RepositoryMirror> {
        self.synchronizer.mirror()
    }

    async fn binary_project(&self, dependency: &Dependency) -> Result<BinaryProject, ProviderError> {
        if let Some(project) = self.binary_projects.read().await.get(dependency) {
            trace!(dependency = %dependency, "Binary project cache hit");
            return Ok(project.clone());
        }

        self.synchronizer
            .announce(ProjectEvent::DownloadingBinaryDefinition {
                dependency: dependency.clone(),
                url: dependency.address().to_string(),
            });
        let json = self.download_definition(dependency.address()).await?;
        let project =
            BinaryProject::from_json(&json).map_err(|e| ProviderError::BinaryProject {
                dependency: dependency.clone(),
                reason: e.to_string(),
            })?;
        debug!(dependency = %dependency, versions = project.versions.len(), "Loaded binary project");

        self.binary_projects
            .write()
            .await
            .insert(dependency.clone(), project.clone());
        Ok(project)
    }

    async fn download_definition(&self, address: &str) -> Result<String, ProviderError> {
        let download_error = |reason: String| ProviderError::Download {
            url: address.to_string(),
            reason,
        };
        let url = Url::parse(address).map_err(|e| download_error(e.to_string()))?;

        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|()| download_error("not a local path".to_string()))?;
            return tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| download_error(e.to_string()));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;
        response.text().await.map_err(|e| download_error(e.to_string()))
    }

    async fn git_requirements(
        &self,
        dependency: &Dependency,
        version: &PinnedVersion,
    ) -> Result<Requirements, ProviderError> {
        self.synchronizer
            .sync(dependency, Some(version.as_str()))
            .await?;

        let contents = self
            .mirror()
            .contents_of_file(dependency, version.as_str(), CARTFILE_PATH)
            .await
            .map_err(|e| mirror_error(dependency, e))?;
        let Some(contents) = contents else {
            return Ok(Requirements::default());
        };

        let cartfile =
            Cartfile::parse(CARTFILE_PATH, &contents).map_err(|e| ProviderError::Manifest {
                dependency: dependency.clone(),
                version: version.clone(),
                reason: e.to_string(),
            })?;
        Ok(Requirements::new(
            cartfile
                .entries
                .into_iter()
                .map(|entry| (entry.dependency, entry.specifier))
                .collect(),
        ))
    }
}

fn mirror_error(dependency: &Dependency, error: MirrorError) -> ProviderError {
    ProviderError::Mirror {
        dependency: dependency.clone(),
        reason: error.to_string(),
    }
}

impl RequirementProvider for LiveProvider {
    fn versions(&self, dependency: &Dependency) -> ProviderFuture<'_, Vec<PinnedVersion>> {
        let dependency = dependency.clone();

        Box::pin(async move {
            if dependency.is_binary() {
                return Ok(self.binary_project(&dependency).await?.pinned_versions());
            }

            self.synchronizer.sync(&dependency, None).await?;
            let tags = self
                .mirror()
                .list_tags(&dependency)
                .await
                .map_err(|e| mirror_error(&dependency, e))?;

            let mut versions: Vec<PinnedVersion> = tags
                .into_iter()
                .map(PinnedVersion::new)
                .filter(PinnedVersion::is_semantic)
                .collect();
            versions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            sort_descending(&mut versions);
            Ok(versions)
        })
    }

    fn requirements(
        &self,
        dependency: &Dependency,
        version: &PinnedVersion,
    ) -> ProviderFuture<'_, Requirements> {
        let dependency = dependency.clone();
        let version = version.clone();

        Box::pin(async move {
            if !dependency.is_binary() {
                return self.git_requirements(&dependency, &version).await;
            }

            let project = self.binary_project(&dependency).await?;
            if project.versions.contains_key(&version) {
                Ok(Requirements::binary())
            } else {
                Err(ProviderError::UnknownVersion {
                    dependency,
                    version,
                })
            }
        })
    }

    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> ProviderFuture<'_, PinnedVersion> {
        let dependency = dependency.clone();
        let reference = reference.to_string();

        Box::pin(async move {
            if !dependency.is_binary() {
                self.synchronizer
                    .sync(&dependency, Some(&reference))
                    .await?;
                let resolved = self
                    .mirror()
                    .resolve_reference(&dependency, &reference)
                    .await
                    .map_err(|e| mirror_error(&dependency, e))?;
                if let Some(commit) = resolved {
                    return Ok(PinnedVersion::new(commit));
                }
            }

            Err(ProviderError::UnknownReference {
                dependency,
                reference,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    include!("live.test.rs");
}
