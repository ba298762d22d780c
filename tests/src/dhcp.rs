// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network boot configuration tests: every guest profile must produce a
//! descriptor that a DHCP-booted guest can come up with.

use tracing::info;
use vit_framework::api::{RecordingVmiApi, VmiApi};
use vit_framework::arch::GuestArch;
use vit_framework::vmi::factory::small_guest_memory;
use vit_framework::vmi::VmiOption;
use vit_testcase::*;

#[vit_testcase]
fn cirros_dhcp_boot_defaults(ctx: &Framework) {
    let vmi = ctx.vmi_factory.new_cirros(&[]);

    assert!(!vmi.name.is_empty());
    assert_eq!(
        vmi.memory.as_deref(),
        Some(small_guest_memory(ctx.guest_arch))
    );
    assert_eq!(vmi.termination_grace_period_secs, 0);
    assert!(!vmi.rng_device);

    let cloud_init = vmi
        .cloud_init
        .as_ref()
        .expect("CirrOS descriptors carry default user data");
    assert!(!cloud_init.user_data.is_empty());
    assert!(cloud_init.ensure_non_empty);
}

#[vit_testcase]
fn caller_memory_override_wins(ctx: &Framework) {
    let vmi = ctx
        .vmi_factory
        .new_cirros(&[VmiOption::ResourceMemory("64Mi".to_string())]);

    assert_eq!(vmi.memory.as_deref(), Some("64Mi"));
    assert_eq!(vmi.termination_grace_period_secs, 0);
    assert!(vmi.cloud_init.is_some());
}

#[vit_testcase]
fn every_profile_submits_cleanly(ctx: &Framework) {
    let api = RecordingVmiApi::default();
    let vmis = [
        ctx.vmi_factory.new_fedora(&[]),
        ctx.vmi_factory.new_cirros(&[]),
        ctx.vmi_factory.new_alpine(&[]),
        ctx.vmi_factory.new_alpine_with_test_tooling(&[]),
    ];

    for vmi in &vmis {
        info!(name = %vmi.name, "submitting VMI descriptor");
        api.create_vmi(vmi)?;
    }

    let submitted = api.submitted();
    assert_eq!(submitted.len(), vmis.len());
    for (sent, received) in vmis.iter().zip(submitted.iter()) {
        assert_eq!(sent, received);
    }
}

#[vit_testcase]
fn vmi_names_are_process_unique(ctx: &Framework) {
    let mut names = std::collections::BTreeSet::new();
    for _ in 0..32 {
        let vmi = ctx.vmi_factory.new_alpine(&[]);
        assert!(!vmi.name.is_empty());
        assert!(names.insert(vmi.name), "factory reused a VMI name");
    }
}

#[vit_testcase]
fn arm64_guests_get_larger_default_memory(ctx: &Framework) {
    if ctx.guest_arch != GuestArch::Aarch64 {
        vit_skip!("requires an arm64 test target");
    }

    assert_eq!(
        ctx.vmi_factory.new_cirros(&[]).memory.as_deref(),
        Some("256Mi")
    );
    assert_eq!(
        ctx.vmi_factory.new_alpine(&[]).memory.as_deref(),
        Some("256Mi")
    );
}
