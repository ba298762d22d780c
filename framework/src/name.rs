// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unique name generation for VMI descriptors.

use rand::Rng;

const NAME_SUFFIX_LEN: usize = 10;
const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A source of process-unique VMI names.
///
/// Implementations must return a non-empty name from every call and must be
/// safe to share between concurrently running tests: two calls, from any
/// threads, never return the same name within one process.
pub trait NameGenerator: Send + Sync {
    fn next_name(&self) -> String;
}

/// Generates names of the form `{prefix}-{suffix}`, with the suffix drawn
/// from the OS random source. The generator holds no mutable state, so a
/// single instance can back parallel factory calls.
pub struct RandomNameGenerator {
    prefix: String,
}

impl RandomNameGenerator {
    pub fn new(prefix: &str) -> Self {
        assert!(!prefix.is_empty(), "VMI name prefix must be non-empty");
        Self { prefix: prefix.to_string() }
    }
}

impl NameGenerator for RandomNameGenerator {
    fn next_name(&self) -> String {
        let mut rng = rand::rngs::OsRng;
        let suffix: String = (0..NAME_SUFFIX_LEN)
            .map(|_| NAME_CHARSET[rng.gen_range(0..NAME_CHARSET.len())] as char)
            .collect();
        format!("{}-{}", self.prefix, suffix)
    }
}
