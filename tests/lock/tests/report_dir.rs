//! Report directory lock tests: persistence, fail-closed reads and digest
//! stability across engines and worlds.

use lock_tests::fixtures::{corridor_maze, diamond, unsolvable};
use meridian_harness::bundle_dir::{
    read_report_dir, verify_report_dir, write_report_dir, BundleDirReadError,
};
use meridian_harness::contract::World;
use meridian_harness::report::RunReport;
use meridian_harness::runner::{run_engine, EngineKind, RunSpec};
use meridian_kernel::proof::canon::canonical_json_bytes;
use meridian_kernel::proof::hash::canonical_hash;
use meridian_kernel::proof::hash_domain::HashDomain;
use meridian_search::SearchConfig;

fn traced_config() -> SearchConfig {
    let mut config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    config.mcts.patience = 200;
    config
}

fn report_for<W: World + 'static>(world: &W, kind: EngineKind) -> RunReport {
    run_engine(world, &RunSpec::new(kind).with_config(traced_config())).unwrap()
}

#[test]
fn every_engine_round_trips_through_disk() {
    let world = diamond();
    for kind in EngineKind::ALL {
        let report = report_for(&world, kind);
        let dir = tempfile::tempdir().unwrap();
        let digest = write_report_dir(&report, dir.path()).unwrap();
        let loaded = verify_report_dir(dir.path()).unwrap();
        assert_eq!(loaded.digest, digest, "{kind}");
        assert_eq!(loaded.engine(), Some(kind.as_str()));
        assert_eq!(loaded.report["world"], "diamond");
    }
}

#[test]
fn repeated_runs_write_identical_directories() {
    let maze = corridor_maze();
    for kind in EngineKind::ALL {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        write_report_dir(&report_for(&maze, kind), a.path()).unwrap();
        write_report_dir(&report_for(&maze, kind), b.path()).unwrap();
        for file in ["report.json", "report_digest.txt", "plan.txt", "trace.json"] {
            assert_eq!(
                std::fs::read(a.path().join(file)).unwrap(),
                std::fs::read(b.path().join(file)).unwrap(),
                "{kind}: {file} differs"
            );
        }
    }
}

#[test]
fn unsolved_report_has_empty_plan_file() {
    let report = report_for(&unsolvable(), EngineKind::AStar);
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&report, dir.path()).unwrap();
    let loaded = verify_report_dir(dir.path()).unwrap();
    assert_eq!(loaded.plan_text, "");
    assert_eq!(loaded.status(), Some("no_solution_exist"));
    assert!(loaded.report["plan"].is_null());
}

#[test]
fn stored_digest_is_domain_separated_hash_of_report_bytes() {
    let report = report_for(&diamond(), EngineKind::AStar);
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&report, dir.path()).unwrap();
    let bytes = std::fs::read(dir.path().join("report.json")).unwrap();
    let stored = std::fs::read_to_string(dir.path().join("report_digest.txt")).unwrap();
    assert_eq!(canonical_hash(HashDomain::RunReport, &bytes).as_str(), stored);
    // Same bytes under another domain give another digest.
    assert_ne!(canonical_hash(HashDomain::SearchTrace, &bytes).as_str(), stored);
}

#[test]
fn report_edit_with_fresh_canonical_bytes_still_fails_digest() {
    let report = report_for(&diamond(), EngineKind::AStar);
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&report, dir.path()).unwrap();

    let path = dir.path().join("report.json");
    let mut value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    value["world"] = serde_json::json!("elsewhere");
    std::fs::write(&path, canonical_json_bytes(&value).unwrap()).unwrap();

    assert!(matches!(
        read_report_dir(dir.path()),
        Err(BundleDirReadError::DigestMismatch { .. })
    ));
}

#[test]
fn schema_version_is_checked() {
    let report = report_for(&diamond(), EngineKind::Greedy);
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&report, dir.path()).unwrap();

    let path = dir.path().join("report.json");
    let mut value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!("run_report.v0");
    std::fs::write(&path, canonical_json_bytes(&value).unwrap()).unwrap();

    assert!(matches!(
        read_report_dir(dir.path()),
        Err(BundleDirReadError::SchemaMismatch { found }) if found == "run_report.v0"
    ));
}

#[test]
fn directory_path_is_not_hashed() {
    let report = report_for(&diamond(), EngineKind::IdaStar);
    let outer = tempfile::tempdir().unwrap();
    let a = write_report_dir(&report, &outer.path().join("a")).unwrap();
    let b = write_report_dir(&report, &outer.path().join("nested").join("b")).unwrap();
    assert_eq!(a, b);
}
