// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The VIT framework: interfaces for building virtual machine instance (VMI)
//! descriptors for integration tests against the platform API.

pub mod api;
pub mod arch;
pub mod artifacts;
pub mod guest_os;
pub mod name;
pub mod vmi;

use anyhow::Context;

use crate::arch::GuestArch;
use crate::artifacts::ArtifactStore;
use crate::name::RandomNameGenerator;
use crate::vmi::factory::VmiFactory;

/// Parameters used to construct a new test [`Framework`].
pub struct FrameworkParameters {
    /// The artifact manifest listing the container disks available to this
    /// run. `None` selects the stock manifest.
    pub artifact_manifest: Option<camino::Utf8PathBuf>,

    /// The CPU architecture of the test target.
    pub guest_arch: GuestArch,

    /// The prefix prepended to every generated VMI name.
    pub vmi_name_prefix: String,
}

/// The context handed to each test case in a suite run.
pub struct Framework {
    pub artifact_store: ArtifactStore,
    pub vmi_factory: VmiFactory,
    pub guest_arch: GuestArch,
}

impl Framework {
    pub fn new(params: FrameworkParameters) -> anyhow::Result<Self> {
        let artifact_store = match &params.artifact_manifest {
            Some(path) => ArtifactStore::from_toml_path(path)
                .context("loading artifact manifest")?,
            None => ArtifactStore::default(),
        };

        let name_gen =
            Box::new(RandomNameGenerator::new(&params.vmi_name_prefix));
        let vmi_factory =
            VmiFactory::new(&artifact_store, name_gen, params.guest_arch)
                .context("building VMI factory")?;

        Ok(Self {
            artifact_store,
            vmi_factory,
            guest_arch: params.guest_arch,
        })
    }
}
