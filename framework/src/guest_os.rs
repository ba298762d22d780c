// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Guest OS profiles the VMI factories know how to configure.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GuestOsKind {
    Fedora,
    Cirros,
    Alpine,

    /// Alpine with guest test tooling preinstalled. Configured identically to
    /// [`GuestOsKind::Alpine`] apart from the backing container disk.
    AlpineTestTooling,
}

impl GuestOsKind {
    pub const ALL: [GuestOsKind; 4] = [
        GuestOsKind::Fedora,
        GuestOsKind::Cirros,
        GuestOsKind::Alpine,
        GuestOsKind::AlpineTestTooling,
    ];

    /// Returns the key under which this profile's container disk appears in
    /// the artifact manifest.
    pub fn container_disk_key(&self) -> &'static str {
        match self {
            Self::Fedora => "fedora-with-test-tooling",
            Self::Cirros => "cirros",
            Self::Alpine => "alpine",
            Self::AlpineTestTooling => "alpine-with-test-tooling",
        }
    }
}

impl FromStr for GuestOsKind {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fedora" => Ok(Self::Fedora),
            "cirros" => Ok(Self::Cirros),
            "alpine" => Ok(Self::Alpine),
            "alpine-test-tooling" => Ok(Self::AlpineTestTooling),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Unrecognized guest OS kind {}", s),
            )),
        }
    }
}

impl Display for GuestOsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fedora => "fedora",
            Self::Cirros => "cirros",
            Self::Alpine => "alpine",
            Self::AlpineTestTooling => "alpine-test-tooling",
        })
    }
}
