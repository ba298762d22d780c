// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{error, info};
use vit_testcase::{Framework, TestCase, TestOutcome};

use crate::config::RunOptions;
use crate::fixtures::TestFixtures;

/// Statistics returned after executing a set of tests.
pub struct ExecutionStats {
    /// The number of tests that passed.
    pub tests_passed: u32,

    /// The number of tests that failed.
    pub tests_failed: u32,

    /// The number of tests that marked themselves as skipped.
    pub tests_skipped: u32,

    /// The number of tests that the runner decided not to run (e.g. because
    /// of a failure in a fixture).
    pub tests_not_run: u32,

    /// The total time spent running tests and fixtures. This spans the time
    /// from just before the first suite setup fixture runs to the time just
    /// after the last fixture finishes.
    pub duration: Duration,

    /// A collection of test cases that returned a failed result.
    pub failed_test_cases: Vec<&'static TestCase>,
}

/// Installs the global assertion-failure handler: panic messages are routed
/// through the logging sink rather than printed raw to stderr, and each test
/// body runs under `catch_unwind`, so a failed assertion is recorded as a
/// failed test instead of aborting the run.
fn install_failure_handler() {
    panic::set_hook(Box::new(|panic_info| {
        error!("assertion failure in test body: {}", panic_info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

/// Executes the selected tests using the supplied test context.
pub fn run_tests_with_ctx(
    ctx: &Framework,
    mut fixtures: TestFixtures<'_>,
    run_opts: &RunOptions,
) -> ExecutionStats {
    let executions: Vec<&'static TestCase> =
        vit_tests::vit_testcase::filtered_test_cases(
            &run_opts.include_filter,
            &run_opts.exclude_filter,
        )
        .collect();

    let mut stats = ExecutionStats {
        tests_passed: 0,
        tests_failed: 0,
        tests_skipped: 0,
        tests_not_run: executions.len() as u32,
        duration: Duration::default(),
        failed_test_cases: Vec::new(),
    };

    if executions.is_empty() {
        info!("No tests selected for execution");
        return stats;
    }

    install_failure_handler();

    info!("Running {} test(s)", executions.len());
    let start_time = Instant::now();

    // Failure to run the suite setup fixture is fatal to the run, but it's
    // still possible to report results, so return gracefully instead of
    // panicking.
    if let Err(e) = fixtures.execution_setup() {
        error!("Error running suite setup fixture: {}", e);
        stats.duration = start_time.elapsed();
        return stats;
    }

    for tc in executions {
        info!("Starting test {}", tc.fully_qualified_name());

        if let Err(e) = fixtures.test_setup() {
            error!("Error running test setup fixture: {}", e);
            break;
        }

        stats.tests_not_run -= 1;

        let test_outcome =
            panic::catch_unwind(AssertUnwindSafe(|| tc.run(ctx)))
                .unwrap_or_else(|payload| {
                    TestOutcome::Failed(panic_message(payload.as_ref()))
                });

        info!(
            "test {} ... {}{}",
            tc.fully_qualified_name(),
            match test_outcome {
                TestOutcome::Passed => "ok",
                TestOutcome::Failed(_) => "FAILED: ",
                TestOutcome::Skipped(_) => "skipped: ",
            },
            match &test_outcome {
                TestOutcome::Failed(Some(s))
                | TestOutcome::Skipped(Some(s)) => s,
                TestOutcome::Failed(None) | TestOutcome::Skipped(None) =>
                    "[no message]",
                _ => "",
            }
        );

        match test_outcome {
            TestOutcome::Passed => stats.tests_passed += 1,
            TestOutcome::Failed(_) => {
                stats.tests_failed += 1;
                stats.failed_test_cases.push(tc);
            }
            TestOutcome::Skipped(_) => stats.tests_skipped += 1,
        }

        if let Err(e) = fixtures.test_cleanup() {
            error!("Error running cleanup fixture: {}", e);
            break;
        }
    }

    if let Err(e) = fixtures.execution_cleanup() {
        error!("Error running suite cleanup fixture: {}", e);
    }

    stats.duration = start_time.elapsed();
    stats
}
