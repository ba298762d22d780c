// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub use vit_testcase;

/// The name under which this suite's run is reported.
pub const SUITE_NAME: &str = "DHCP test Suite";

mod dhcp;
