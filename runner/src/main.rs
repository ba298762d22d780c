// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod config;
mod execute;
mod fixtures;

use clap::Parser;
use config::{ListOptions, LogFormat, ProcessArgs, RunOptions};
use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};
use vit_framework::arch::GuestArch;
use vit_testcase::{Framework, FrameworkParameters};

use crate::execute::ExecutionStats;
use crate::fixtures::TestFixtures;

fn main() -> anyhow::Result<()> {
    let runner_args = ProcessArgs::parse();
    set_tracing_subscriber(&runner_args);

    info!(?runner_args);

    match &runner_args.command {
        config::Command::Run(opts) => {
            let exit_code = run_suite(opts)?.tests_failed;
            std::process::exit(exit_code.try_into().unwrap());
        }
        config::Command::List(opts) => list_tests(opts),
    }

    Ok(())
}

/// Starts the suite run. The logging sink already points at the reporter
/// (set up in `main`); the execution engine installs the failure handler
/// before the first test runs.
fn run_suite(run_opts: &RunOptions) -> anyhow::Result<ExecutionStats> {
    let ctx_params = FrameworkParameters {
        artifact_manifest: run_opts.artifact_manifest_path.clone(),
        guest_arch: run_opts.guest_arch.unwrap_or_else(|| {
            GuestArch::host()
                .expect("host architecture is a supported test target")
        }),
        vmi_name_prefix: run_opts.vmi_name_prefix.clone(),
    };

    let ctx = Framework::new(ctx_params)
        .expect("should be able to set up a test context");
    let fixtures = TestFixtures::new(&ctx)?;

    info!(suite = vit_tests::SUITE_NAME, "Starting suite run");

    // Run the tests and print results.
    let execution_stats = execute::run_tests_with_ctx(&ctx, fixtures, run_opts);
    if !execution_stats.failed_test_cases.is_empty() {
        println!("\nfailures:");
        for tc in &execution_stats.failed_test_cases {
            println!("    {}", tc.fully_qualified_name());
        }
        println!();
    }

    println!(
        "test result: {}. {} passed; {} failed; {} skipped; {} not run; \
        finished in {:.2}s\n",
        if execution_stats.tests_failed != 0 { "FAILED" } else { "ok" },
        execution_stats.tests_passed,
        execution_stats.tests_failed,
        execution_stats.tests_skipped,
        execution_stats.tests_not_run,
        execution_stats.duration.as_secs_f64()
    );

    Ok(execution_stats)
}

fn list_tests(list_opts: &ListOptions) {
    println!("Tests enabled after applying filters:\n");

    let mut count = 0;
    for tc in vit_tests::vit_testcase::filtered_test_cases(
        &list_opts.include_filter,
        &list_opts.exclude_filter,
    ) {
        println!("    {}", tc.fully_qualified_name());
        count += 1
    }

    println!("\n{} test(s) selected", count);
}

fn set_tracing_subscriber(args: &ProcessArgs) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into());
    let subscriber = Registry::default().with(filter.from_env_lossy());
    match args.log_format() {
        LogFormat::Bunyan => {
            let bunyan_layer =
                BunyanFormattingLayer::new("vit-runner".into(), std::io::stdout);
            let subscriber = subscriber.with(JsonStorageLayer).with(bunyan_layer);
            tracing::subscriber::set_global_default(subscriber).unwrap();
        }
        LogFormat::Plain => {
            let stdout_log = tracing_subscriber::fmt::layer()
                .with_line_number(true)
                .with_ansi(!args.disable_ansi);
            let subscriber = subscriber.with(stdout_log);
            tracing::subscriber::set_global_default(subscriber).unwrap();
        }
    }
}
