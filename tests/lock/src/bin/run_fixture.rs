//! Binary that runs every engine over the fixture worlds and prints
//! deterministic output lines for cross-process verification.
//!
//! Usage: `run_fixture`
//!
//! Output: one `world/engine key=value ...` line per run.

use lock_tests::fixtures::{corridor_maze, diamond};
use meridian_harness::contract::World;
use meridian_harness::report::RunReport;
use meridian_harness::runner::{run_engine, EngineKind, RunSpec};
use meridian_harness::worlds::puzzle::SlidingPuzzle;
use meridian_kernel::proof::hash::ContentHash;
use meridian_search::SearchConfig;

fn print_line(report: &RunReport) {
    let digest = report.digest().expect("report digest");
    let trace = report.trace_digest().map_or("none", ContentHash::as_str);
    let plan = report.plan.as_ref().map_or("none", |p| p.text.as_str());
    println!(
        "{}/{} status={} plan={} report_digest={} trace_digest={}",
        report.world,
        report.engine,
        report.status,
        plan,
        digest.as_str(),
        trace,
    );
}

fn run_all<W: World + 'static>(world: &W, config: &SearchConfig) {
    for kind in EngineKind::ALL {
        let spec = RunSpec::new(kind).with_config(config.clone());
        let report = run_engine(world, &spec).expect("run failed");
        print_line(&report);
    }
}

fn main() {
    let mut config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    config.mcts.patience = 300;
    config.mcts.seed = 42;

    run_all(&diamond(), &config);
    run_all(&corridor_maze(), &config);
    run_all(&SlidingPuzzle::scrambled(12, 5), &config);
}
