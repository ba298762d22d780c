// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composable options applied to a descriptor during construction.

use super::{CloudInitNoCloud, VmInstanceSpec};

/// A single configuration edit applied to a [`VmInstanceSpec`] under
/// construction.
///
/// Options are plain data; [`VmInstanceSpec::compose`] applies them in list
/// order, so list position is what decides precedence between options that
/// target the same field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmiOption {
    /// Sets the termination grace period, in seconds.
    TerminationGracePeriod(u64),

    /// Sets the requested guest memory to the supplied quantity string.
    ResourceMemory(String),

    /// Attaches a virtio RNG device.
    Rng,

    /// Points the boot volume at the supplied container disk reference.
    ContainerDisk(String),

    /// Supplies a cloud-init NoCloud user data payload.
    CloudInitNoCloudUserData { user_data: String, ensure_non_empty: bool },
}

impl VmiOption {
    /// Applies this option to `spec`, rewriting only the fields it targets.
    pub(super) fn apply(&self, spec: &mut VmInstanceSpec) {
        match self {
            Self::TerminationGracePeriod(secs) => {
                spec.termination_grace_period_secs = *secs;
            }
            Self::ResourceMemory(quantity) => {
                spec.memory = Some(quantity.clone());
            }
            Self::Rng => {
                spec.rng_device = true;
            }
            Self::ContainerDisk(image) => {
                spec.container_disk = Some(image.clone());
            }
            Self::CloudInitNoCloudUserData { user_data, ensure_non_empty } => {
                spec.cloud_init = Some(CloudInitNoCloud {
                    user_data: user_data.clone(),
                    ensure_non_empty: *ensure_non_empty,
                });
            }
        }
    }
}
