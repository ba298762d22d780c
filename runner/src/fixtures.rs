// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use tracing::instrument;
use vit_framework::Framework;

/// Fixtures run around the whole suite and around each test.
pub struct TestFixtures<'a> {
    framework: &'a Framework,
}

impl<'a> TestFixtures<'a> {
    pub fn new(framework: &'a Framework) -> Result<Self> {
        Ok(Self { framework })
    }

    /// Runs once before the first test in the suite.
    #[instrument(skip_all)]
    pub fn execution_setup(&mut self) -> Result<()> {
        self.framework.artifact_store.verify_profile_disks()
    }

    /// Runs once after the last test in the suite.
    #[instrument(skip_all)]
    pub fn execution_cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs before each test.
    #[instrument(skip_all)]
    pub fn test_setup(&mut self) -> Result<()> {
        self.framework.artifact_store.verify_profile_disks()
    }

    /// Runs after each test.
    #[instrument(skip_all)]
    pub fn test_cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
