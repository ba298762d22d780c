// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile factories for ready-to-submit VMI descriptors.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::arch::GuestArch;
use crate::artifacts::{ArtifactStore, ArtifactStoreError};
use crate::guest_os::GuestOsKind;
use crate::name::NameGenerator;
use crate::vmi::{VmInstanceSpec, VmiOption};

/// The termination grace period every factory applies unless a caller option
/// overrides it.
pub const DEFAULT_TEST_GRACE_PERIOD_SECS: u64 = 0;

/// The default boot-time user data for CirrOS guests. Without a NoCloud
/// payload the CirrOS image waits out a multi-minute datasource timeout
/// before allowing login.
pub const CIRROS_DEFAULT_USER_DATA: &str = "#!/bin/bash\necho hello\n";

/// Returns the default memory quantity for the small CirrOS and Alpine
/// guests on the supplied architecture.
pub fn small_guest_memory(arch: GuestArch) -> &'static str {
    match arch {
        GuestArch::Aarch64 => "256Mi",
        GuestArch::X86_64 => "128Mi",
    }
}

#[derive(Debug, Error)]
pub enum FactoryConstructionError {
    #[error("Container disk for guest profile {profile} not available")]
    ProfileDiskMissing {
        profile: GuestOsKind,
        #[source]
        source: ArtifactStoreError,
    },
}

/// Builds descriptors for each supported guest OS profile.
///
/// The factory resolves every profile's container disk when it is built, so
/// the per-profile constructors are infallible. Each constructor assembles
/// the profile's default option list, appends the caller's options after it
/// (caller options win on shared fields), and folds the result over a fresh
/// uniquely-named descriptor.
pub struct VmiFactory {
    container_disks: BTreeMap<GuestOsKind, String>,
    name_gen: Box<dyn NameGenerator>,
    guest_arch: GuestArch,
}

impl std::fmt::Debug for VmiFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VmiFactory")
            .field("container_disks", &self.container_disks)
            .field("name_gen", &"<dyn NameGenerator>")
            .field("guest_arch", &self.guest_arch)
            .finish()
    }
}

impl VmiFactory {
    pub fn new(
        store: &ArtifactStore,
        name_gen: Box<dyn NameGenerator>,
        guest_arch: GuestArch,
    ) -> Result<Self, FactoryConstructionError> {
        let mut container_disks = BTreeMap::new();
        for profile in GuestOsKind::ALL {
            let image = store.container_disk_for(profile).map_err(|source| {
                FactoryConstructionError::ProfileDiskMissing { profile, source }
            })?;
            container_disks.insert(profile, image);
        }

        info!(%guest_arch, "Building VMI factory");
        Ok(Self { container_disks, name_gen, guest_arch })
    }

    /// Instantiates a new Fedora based VMI configuration, building its extra
    /// properties from the supplied options. This image carries tooling for
    /// the guest agent, stress testing, and more.
    pub fn new_fedora(&self, opts: &[VmiOption]) -> VmInstanceSpec {
        let defaults = vec![
            VmiOption::TerminationGracePeriod(DEFAULT_TEST_GRACE_PERIOD_SECS),
            VmiOption::ResourceMemory("512M".to_string()),
            VmiOption::Rng,
            VmiOption::ContainerDisk(self.container_disk(GuestOsKind::Fedora)),
        ];
        self.compose_with_defaults(defaults, opts)
    }

    /// Instantiates a new CirrOS based VMI configuration.
    pub fn new_cirros(&self, opts: &[VmiOption]) -> VmInstanceSpec {
        let with_non_empty_user_data = VmiOption::CloudInitNoCloudUserData {
            user_data: CIRROS_DEFAULT_USER_DATA.to_string(),
            ensure_non_empty: true,
        };

        let defaults = vec![
            VmiOption::ContainerDisk(self.container_disk(GuestOsKind::Cirros)),
            with_non_empty_user_data,
            VmiOption::ResourceMemory(
                small_guest_memory(self.guest_arch).to_string(),
            ),
            VmiOption::TerminationGracePeriod(DEFAULT_TEST_GRACE_PERIOD_SECS),
        ];
        self.compose_with_defaults(defaults, opts)
    }

    /// Instantiates a new Alpine based VMI configuration.
    pub fn new_alpine(&self, opts: &[VmiOption]) -> VmInstanceSpec {
        self.new_alpine_from(GuestOsKind::Alpine, opts)
    }

    /// Instantiates a new Alpine based VMI configuration backed by the image
    /// with guest test tooling preinstalled.
    pub fn new_alpine_with_test_tooling(
        &self,
        opts: &[VmiOption],
    ) -> VmInstanceSpec {
        self.new_alpine_from(GuestOsKind::AlpineTestTooling, opts)
    }

    // The two Alpine profiles differ only in which container disk backs
    // them.
    fn new_alpine_from(
        &self,
        profile: GuestOsKind,
        opts: &[VmiOption],
    ) -> VmInstanceSpec {
        let defaults = vec![
            VmiOption::ContainerDisk(self.container_disk(profile)),
            VmiOption::ResourceMemory(
                small_guest_memory(self.guest_arch).to_string(),
            ),
            VmiOption::Rng,
            VmiOption::TerminationGracePeriod(DEFAULT_TEST_GRACE_PERIOD_SECS),
        ];
        self.compose_with_defaults(defaults, opts)
    }

    fn compose_with_defaults(
        &self,
        mut defaults: Vec<VmiOption>,
        opts: &[VmiOption],
    ) -> VmInstanceSpec {
        defaults.extend(opts.iter().cloned());
        VmInstanceSpec::compose(&self.name_gen.next_name(), &defaults)
    }

    fn container_disk(&self, profile: GuestOsKind) -> String {
        // Every profile was resolved when the factory was constructed.
        self.container_disks[&profile].clone()
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// A deterministic generator standing in for the random one, to show the
    /// factory takes whatever name source it is given.
    struct CountingNameGenerator(AtomicU64);

    impl NameGenerator for CountingNameGenerator {
        fn next_name(&self) -> String {
            format!("vmi-{}", self.0.fetch_add(1, Ordering::Relaxed))
        }
    }

    fn test_factory(arch: GuestArch) -> VmiFactory {
        VmiFactory::new(
            &ArtifactStore::default(),
            Box::new(CountingNameGenerator(AtomicU64::new(0))),
            arch,
        )
        .unwrap()
    }

    fn profiles(
        factory: &VmiFactory,
    ) -> Vec<(GuestOsKind, VmInstanceSpec)> {
        vec![
            (GuestOsKind::Fedora, factory.new_fedora(&[])),
            (GuestOsKind::Cirros, factory.new_cirros(&[])),
            (GuestOsKind::Alpine, factory.new_alpine(&[])),
            (
                GuestOsKind::AlpineTestTooling,
                factory.new_alpine_with_test_tooling(&[]),
            ),
        ]
    }

    #[test]
    fn small_guest_memory_by_arch() {
        assert_eq!(small_guest_memory(GuestArch::Aarch64), "256Mi");
        assert_eq!(small_guest_memory(GuestArch::X86_64), "128Mi");
    }

    #[test]
    fn every_profile_gets_a_fresh_nonempty_name() {
        let factory = test_factory(GuestArch::X86_64);
        let mut names = std::collections::BTreeSet::new();
        for (_, vmi) in profiles(&factory) {
            assert!(!vmi.name.is_empty());
            assert!(names.insert(vmi.name));
        }
    }

    #[test]
    fn injected_name_generator_is_used() {
        let factory = test_factory(GuestArch::X86_64);
        assert_eq!(factory.new_fedora(&[]).name, "vmi-0");
        assert_eq!(factory.new_cirros(&[]).name, "vmi-1");
    }

    #[test]
    fn default_grace_period_is_zero_for_every_profile() {
        let factory = test_factory(GuestArch::X86_64);
        for (profile, vmi) in profiles(&factory) {
            assert_eq!(
                vmi.termination_grace_period_secs, 0,
                "profile {}",
                profile
            );
        }
    }

    #[test]
    fn default_rng_presence_per_profile() {
        let factory = test_factory(GuestArch::X86_64);
        for (profile, vmi) in profiles(&factory) {
            let wants_rng = profile != GuestOsKind::Cirros;
            assert_eq!(vmi.rng_device, wants_rng, "profile {}", profile);
        }
    }

    #[test]
    fn fedora_memory_ignores_architecture() {
        for arch in [GuestArch::X86_64, GuestArch::Aarch64] {
            let factory = test_factory(arch);
            assert_eq!(
                factory.new_fedora(&[]).memory.as_deref(),
                Some("512M")
            );
        }
    }

    #[test]
    fn small_profiles_size_memory_by_architecture() {
        for (arch, expected) in
            [(GuestArch::X86_64, "128Mi"), (GuestArch::Aarch64, "256Mi")]
        {
            let factory = test_factory(arch);
            assert_eq!(
                factory.new_cirros(&[]).memory.as_deref(),
                Some(expected)
            );
            assert_eq!(
                factory.new_alpine(&[]).memory.as_deref(),
                Some(expected)
            );
            assert_eq!(
                factory
                    .new_alpine_with_test_tooling(&[])
                    .memory
                    .as_deref(),
                Some(expected)
            );
        }
    }

    #[test]
    fn caller_memory_override_wins_for_every_profile() {
        let factory = test_factory(GuestArch::X86_64);
        let override_opt =
            [VmiOption::ResourceMemory("64Mi".to_string())];
        for vmi in [
            factory.new_fedora(&override_opt),
            factory.new_cirros(&override_opt),
            factory.new_alpine(&override_opt),
            factory.new_alpine_with_test_tooling(&override_opt),
        ] {
            assert_eq!(vmi.memory.as_deref(), Some("64Mi"));
        }
    }

    #[test]
    fn cirros_memory_override_keeps_other_defaults() {
        let factory = test_factory(GuestArch::X86_64);
        let vmi = factory
            .new_cirros(&[VmiOption::ResourceMemory("64Mi".to_string())]);

        assert_eq!(vmi.memory.as_deref(), Some("64Mi"));
        assert_eq!(vmi.termination_grace_period_secs, 0);
        let cloud_init = vmi.cloud_init.unwrap();
        assert_eq!(cloud_init.user_data, CIRROS_DEFAULT_USER_DATA);
        assert!(cloud_init.ensure_non_empty);
    }

    #[test]
    fn cirros_can_opt_into_rng() {
        let factory = test_factory(GuestArch::X86_64);
        assert!(factory.new_cirros(&[VmiOption::Rng]).rng_device);
    }

    #[test]
    fn fedora_defaults_on_x86_64() {
        let factory = test_factory(GuestArch::X86_64);
        let vmi = factory.new_fedora(&[]);

        assert_eq!(vmi.memory.as_deref(), Some("512M"));
        assert_eq!(vmi.termination_grace_period_secs, 0);
        assert!(vmi.rng_device);
        assert_eq!(vmi.cloud_init, None);

        let disk = vmi.container_disk.unwrap();
        assert!(disk.contains("fedora-with-test-tooling"));
    }

    #[test]
    fn alpine_tooling_differs_from_alpine_only_in_disk() {
        let factory = test_factory(GuestArch::X86_64);
        let mut plain = factory.new_alpine(&[]);
        let mut tooling = factory.new_alpine_with_test_tooling(&[]);

        assert_ne!(plain.container_disk, tooling.container_disk);

        // With the disk and the generated name normalized away, the two
        // profiles are identical.
        plain.container_disk = None;
        tooling.container_disk = None;
        plain.name.clear();
        tooling.name.clear();
        assert_eq!(plain, tooling);
    }

    #[test]
    fn missing_profile_disk_fails_factory_construction() {
        let manifest = crate::artifacts::Manifest {
            container_disks: std::collections::BTreeMap::from([(
                "cirros".to_string(),
                "cirros-disk".to_string(),
            )]),
            ..crate::artifacts::Manifest::default()
        };

        let err = VmiFactory::new(
            &ArtifactStore::from_manifest(manifest),
            Box::new(CountingNameGenerator(AtomicU64::new(0))),
            GuestArch::X86_64,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            FactoryConstructionError::ProfileDiskMissing { .. }
        ));
    }
}
