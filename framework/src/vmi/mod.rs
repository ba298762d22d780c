// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VMI descriptors and the option fold that builds them.

pub mod factory;
mod options;

pub use options::VmiOption;

use serde::{Deserialize, Serialize};

/// A cloud-init "NoCloud" boot-time payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudInitNoCloud {
    pub user_data: String,

    /// When set, the platform pads an empty payload so the guest always sees
    /// a non-empty NoCloud drive.
    pub ensure_non_empty: bool,
}

/// A virtual machine instance descriptor, ready to submit to the platform
/// API once construction finishes.
///
/// Descriptors are built by [`VmInstanceSpec::compose`] and the profile
/// factories in [`factory`]; after a factory returns one, nothing in this
/// crate mutates it again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInstanceSpec {
    /// The instance name. Factory-produced descriptors get a fresh
    /// process-unique name.
    pub name: String,

    /// The requested guest memory, as a quantity string such as "512M".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// Seconds the platform waits for the guest to shut down before killing
    /// it.
    pub termination_grace_period_secs: u64,

    /// Whether the guest gets a virtio RNG device.
    pub rng_device: bool,

    /// The container disk image reference backing the guest's boot volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_disk: Option<String>,

    /// Boot-time user data, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<CloudInitNoCloud>,
}

impl VmInstanceSpec {
    /// Creates a bare descriptor with the supplied name and no resources or
    /// devices configured.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            memory: None,
            termination_grace_period_secs: 0,
            rng_device: false,
            container_disk: None,
            cloud_init: None,
        }
    }

    /// Builds a descriptor by applying `options` in order to a bare
    /// descriptor named `name`.
    ///
    /// Each option rewrites only the fields it targets. When two options
    /// target the same field, the later one wins outright; no field is
    /// merged.
    pub fn compose(name: &str, options: &[VmiOption]) -> Self {
        let mut spec = Self::new(name);
        for option in options {
            option.apply(&mut spec);
        }
        spec
    }
}
