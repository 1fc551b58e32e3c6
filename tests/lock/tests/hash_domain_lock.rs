//! Hash domain governance.
//!
//! Every digest the workspace persists is computed under one of the four
//! `HashDomain` prefixes. Adding a domain means updating the count here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use meridian_kernel::proof::hash_domain::HashDomain;

#[test]
fn four_domains_cover_plans_traces_configs_and_reports() {
    let names: Vec<String> = HashDomain::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        ["SolutionPlan", "SearchTrace", "SearchConfig", "RunReport"]
    );
}

#[test]
fn domain_bytes_are_distinct_and_follow_the_prefix_convention() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(seen.insert(bytes), "duplicate domain bytes: {domain}");
        assert!(bytes.starts_with(b"MERIDIAN::"), "{domain}: bad prefix");
        assert!(bytes.ends_with(b"::V1\0"), "{domain}: bad suffix");
        // The terminator is the only NUL, so no domain is a prefix of another.
        assert_eq!(bytes.iter().filter(|&&b| b == 0).count(), 1, "{domain}");
    }
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = std::fs::read_dir(dir).unwrap_or_else(|e| panic!("{}: {e}", dir.display()));
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn domain_literals_live_only_in_hash_domain_rs() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut files = Vec::new();
    for crate_dir in ["kernel", "search", "harness"] {
        rust_sources(&root.join(crate_dir).join("src"), &mut files);
    }
    assert!(!files.is_empty());

    let offenders: Vec<String> = files
        .iter()
        .filter(|p| p.file_name().is_some_and(|n| n != "hash_domain.rs"))
        .filter(|p| {
            std::fs::read_to_string(p)
                .map(|text| text.contains("b\"MERIDIAN::"))
                .unwrap_or(false)
        })
        .map(|p| p.display().to_string())
        .collect();
    assert!(offenders.is_empty(), "raw domain literals in {offenders:?}");
}
