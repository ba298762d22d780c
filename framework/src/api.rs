// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The client surface used to submit finished descriptors to the platform.

use std::sync::Mutex;

use crate::vmi::VmInstanceSpec;

/// What this harness needs from a platform API client: accept a finished
/// descriptor for creation. Transport, authentication, and response handling
/// belong to the client implementation, not to descriptor construction.
pub trait VmiApi {
    fn create_vmi(&self, spec: &VmInstanceSpec) -> anyhow::Result<()>;
}

/// An API stub that records submitted descriptors, for tests that need to
/// observe what would have been sent to the platform.
#[derive(Default)]
pub struct RecordingVmiApi {
    submitted: Mutex<Vec<VmInstanceSpec>>,
}

impl RecordingVmiApi {
    pub fn submitted(&self) -> Vec<VmInstanceSpec> {
        self.submitted.lock().unwrap().clone()
    }
}

impl VmiApi for RecordingVmiApi {
    fn create_vmi(&self, spec: &VmInstanceSpec) -> anyhow::Result<()> {
        self.submitted.lock().unwrap().push(spec.clone());
        Ok(())
    }
}
