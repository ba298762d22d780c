// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Support for resolving the container disk images consumed by test runs.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::guest_os::GuestOsKind;

/// The registry prefix used when the manifest doesn't name one.
pub const DEFAULT_DISK_REGISTRY: &str = "quay.io/vit-guest-disks";

/// The image tag used when the manifest doesn't name one.
pub const DEFAULT_DISK_TAG: &str = "latest";

#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error("No container disk with key {0} in the manifest")]
    ContainerDiskMissing(String),

    #[error("Container disk key {0} maps to an empty image name")]
    ContainerDiskEmpty(String),
}

/// An artifact manifest: where container disks are hosted and which image
/// backs each profile disk key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// The registry prefix prepended to every image name.
    pub registry: String,

    /// The tag appended to every image reference.
    pub tag: String,

    /// Maps profile disk keys to image names within the registry.
    pub container_disks: BTreeMap<String, String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            registry: DEFAULT_DISK_REGISTRY.to_string(),
            tag: DEFAULT_DISK_TAG.to_string(),
            container_disks: BTreeMap::from([
                (
                    "cirros".to_string(),
                    "cirros-container-disk-demo".to_string(),
                ),
                (
                    "alpine".to_string(),
                    "alpine-container-disk-demo".to_string(),
                ),
                (
                    "fedora-with-test-tooling".to_string(),
                    "fedora-with-test-tooling-container-disk".to_string(),
                ),
                (
                    "alpine-with-test-tooling".to_string(),
                    "alpine-with-test-tooling-container-disk".to_string(),
                ),
            ]),
        }
    }
}

impl Manifest {
    pub fn from_toml_path(toml_path: &camino::Utf8Path) -> Result<Self> {
        let contents = std::fs::read(toml_path.as_str())?;
        let toml_contents = String::from_utf8_lossy(&contents);
        Ok(toml::from_str(&toml_contents)?)
    }
}

/// A store that resolves container disk keys to submittable image
/// references.
pub struct ArtifactStore {
    manifest: Manifest,
}

impl ArtifactStore {
    pub fn from_manifest(manifest: Manifest) -> Self {
        info!(
            registry = %manifest.registry,
            disks = manifest.container_disks.len(),
            "Building artifact store"
        );
        Self { manifest }
    }

    pub fn from_toml_path(toml_path: &camino::Utf8Path) -> Result<Self> {
        Ok(Self::from_manifest(Manifest::from_toml_path(toml_path)?))
    }

    /// Resolves `key` to a full image reference of the form
    /// `registry/image:tag`.
    pub fn container_disk_by_key(
        &self,
        key: &str,
    ) -> Result<String, ArtifactStoreError> {
        let image =
            self.manifest.container_disks.get(key).ok_or_else(|| {
                ArtifactStoreError::ContainerDiskMissing(key.to_string())
            })?;

        if image.is_empty() {
            return Err(ArtifactStoreError::ContainerDiskEmpty(
                key.to_string(),
            ));
        }

        Ok(format!(
            "{}/{}:{}",
            self.manifest.registry, image, self.manifest.tag
        ))
    }

    /// Resolves the container disk backing `kind`'s profile.
    pub fn container_disk_for(
        &self,
        kind: GuestOsKind,
    ) -> Result<String, ArtifactStoreError> {
        self.container_disk_by_key(kind.container_disk_key())
    }

    /// Verifies that every guest profile's container disk resolves in this
    /// store.
    pub fn verify_profile_disks(&self) -> Result<()> {
        for kind in GuestOsKind::ALL {
            self.container_disk_for(kind).with_context(|| {
                format!("resolving container disk for profile {}", kind)
            })?;
        }
        Ok(())
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::from_manifest(Manifest::default())
    }
}
