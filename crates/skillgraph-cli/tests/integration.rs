#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn skillgraph(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("skillgraph").unwrap();
    cmd.current_dir(dir.path())
        .env("SKILLGRAPH_HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn days_ago_ms(days: i64) -> i64 {
    (chrono::Utc::now() - chrono::Duration::days(days)).timestamp_millis()
}

/// brief: N-C, never used. style: R-B, used yesterday, cites brief.
/// build: SR-B, last used 45 days ago, already has combos.
fn seed_catalog(dir: &TempDir) {
    let home = dir.path();
    for (name, body) in [
        ("brief", "---\nname: brief\nrank: N-C\n---\n# Brief\n"),
        (
            "style",
            "---\nname: style\nrank: R-B\n---\n# Style\n\n## Cross-references\n- **brief**: inputs\n",
        ),
        ("build", "---\nname: build\nrank: SR-B\ncombos:\n  - style\n---\n# Build\n"),
    ] {
        write(&home.join(".agents/skills").join(name).join("SKILL.md"), body);
        std::fs::create_dir_all(home.join(".claude/skills").join(name)).unwrap();
    }
    write(
        &home.join(".claude/CLAUDE.md"),
        "# Notes\n\n### Skill Workflows\n\n| Flow | Chain | Description |\n|---|---|---|\n| **UI** | brief → style(Pick) → build | screens |\n",
    );
    write(
        &home.join(".claude.json"),
        &format!(
            r#"{{"skillUsage": {{"style": {{"lastUsedAt": {}, "usageCount": 12}}, "build": {{"lastUsedAt": {}, "usageCount": 2}}}}}}"#,
            days_ago_ms(1),
            days_ago_ms(45)
        ),
    );
}

fn read(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.path().join(rel)).unwrap()
}

// ---------------------------------------------------------------------------
// skillgraph orchestrate
// ---------------------------------------------------------------------------

#[test]
fn orchestrate_generates_combos_and_queues_review() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .arg("orchestrate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "auto-applied: combos generated (2 entries)",
        ))
        .stdout(predicate::str::contains("needs review: 1 MEDIUM, 1 HIGH"));

    let doc = read(&dir, ".claude/session-env/pending-decisions.md");
    assert!(doc.contains("Parking candidate: `brief` [N-C]"));
    assert!(doc.contains("Downgrade candidate: `build` [SR-B → R-B]"));

    let brief = read(&dir, ".agents/skills/brief/SKILL.md");
    assert!(brief.contains("rank: N-C\ncombos:\n  - style\n  - build\n"));

    let state: serde_json::Value =
        serde_json::from_str(&read(&dir, ".claude/session-env/orchestrator-state.json")).unwrap();
    assert_eq!(state["pendingCount"], 2);
}

#[test]
fn orchestrate_second_run_is_quiet() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir).arg("orchestrate").assert().success();
    skillgraph(&dir)
        .arg("orchestrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("needs review").not());
}

#[test]
fn orchestrate_full_prints_report() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .args(["orchestrate", "--full", "--in-process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Needs review: HIGH (1)"))
        .stdout(predicate::str::contains("Downgrade candidate: `build`"))
        .stdout(predicate::str::contains("undefined combos: 2"));
}

#[test]
fn orchestrate_json_reports_signals() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    let output = skillgraph(&dir)
        .args(["--json", "orchestrate", "--in-process"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["review"].as_array().unwrap().len(), 2);
    assert_eq!(report["review"][1]["risk"], "HIGH");
    assert_eq!(report["suppressed"], false);
}

#[test]
fn orchestrate_on_empty_home_succeeds() {
    let dir = TempDir::new().unwrap();
    skillgraph(&dir)
        .arg("orchestrate")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(!dir
        .path()
        .join(".claude/session-env/pending-decisions.md")
        .exists());
}

// ---------------------------------------------------------------------------
// skillgraph combos
// ---------------------------------------------------------------------------

#[test]
fn combos_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    let output = skillgraph(&dir)
        .args(["combos", "--dry-run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["flows"], 1);
    assert_eq!(report["updated"].as_array().unwrap().len(), 3);
    assert!(!read(&dir, ".agents/skills/brief/SKILL.md").contains("combos:"));
}

#[test]
fn combos_is_idempotent() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .arg("combos")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 3"));
    skillgraph(&dir)
        .arg("combos")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 0, unchanged: 3"));

    let style = read(&dir, ".agents/skills/style/SKILL.md");
    assert!(style.contains("combos:\n  - brief\n  - build\n"));
    assert!(style.ends_with("- **brief**: inputs\n"));
}

// ---------------------------------------------------------------------------
// skillgraph ranks
// ---------------------------------------------------------------------------

#[test]
fn ranks_promotes_busy_entries() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .arg("ranks")
        .assert()
        .success()
        .stdout(predicate::str::contains("style"))
        .stdout(predicate::str::contains("R-A"));
    assert!(read(&dir, ".agents/skills/style/SKILL.md").contains("rank: R-A\n"));
    assert!(read(&dir, ".agents/skills/build/SKILL.md").contains("rank: SR-B\n"));
}

// ---------------------------------------------------------------------------
// skillgraph suggest
// ---------------------------------------------------------------------------

#[test]
fn suggest_shows_once_per_session() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .args(["suggest", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("combos for build:"))
        .stdout(predicate::str::contains("style"));
    skillgraph(&dir)
        .args(["suggest", "build"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn suggest_unknown_entry_is_silent() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);
    skillgraph(&dir)
        .args(["suggest", "nothing-here"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ---------------------------------------------------------------------------
// skillgraph stats / cache / config
// ---------------------------------------------------------------------------

#[test]
fn stats_lists_distribution() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 entries, 3 active"))
        .stdout(predicate::str::contains("SR-B"))
        .stdout(predicate::str::contains("build [SR-B → R-B]"));
}

#[test]
fn cache_show_and_invalidate() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    let output = skillgraph(&dir)
        .args(["cache", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let snap: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snap["meta"]["build"]["rank"], "SR-B");
    assert_eq!(snap["meta"]["build"]["hasCombos"], true);
    assert_eq!(snap["crossRefs"]["style"][0], "brief");

    let snapshot = dir.path().join(".claude/session-env/skills-meta-cache.json");
    assert!(snapshot.exists());
    skillgraph(&dir)
        .args(["cache", "invalidate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!snapshot.exists());
}

#[test]
fn config_show_uses_defaults() {
    let dir = TempDir::new().unwrap();
    skillgraph(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache ttl:         3600s"))
        .stdout(predicate::str::contains("stale after:       30 days"));
}

#[test]
fn config_validate_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join(".claude/skillgraph.yaml"),
        "policy:\n  stale_days: 0\n",
    );
    skillgraph(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] policy.stale_days"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn unreadable_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join(".claude/skillgraph.yaml"), "cache: [");
    skillgraph(&dir)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: failed to load"));
}

#[test]
fn orchestrate_with_broken_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);
    write(&dir.path().join(".claude/skillgraph.yaml"), "cache: [");

    skillgraph(&dir)
        .arg("orchestrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("needs review: 1 MEDIUM, 1 HIGH"))
        .stderr(predicate::str::contains("using defaults"));
    assert!(read(&dir, ".agents/skills/brief/SKILL.md").contains("combos:"));
}

// ---------------------------------------------------------------------------
// skillgraph audit / map
// ---------------------------------------------------------------------------

#[test]
fn audit_flags_broken_references_once_per_change() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);
    write(
        &dir.path().join(".claude/CLAUDE.md"),
        "### Skill Workflows\n| **UI** | brief → gone → build | x |\n| **Data** | duckdb → style | y |\n",
    );
    write(
        &dir.path().join(".claude/skillgraph.yaml"),
        "workflow:\n  ignore: [duckdb]\n",
    );

    skillgraph(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("workflow: 1 broken references"));
    assert!(read(&dir, ".claude/session-env/workflow-issues.md").contains("- UI: gone"));

    skillgraph(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(!dir
        .path()
        .join(".claude/session-env/workflow-issues.md")
        .exists());

    skillgraph(&dir)
        .args(["audit", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x UI: gone"))
        .stdout(predicate::str::contains("(none)"));
}

#[test]
fn audit_json_reports_clean_workflow() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    let output = skillgraph(&dir)
        .args(["--json", "audit", "--full"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["status"], "checked");
    assert_eq!(outcome["report"]["references"], 3);
    assert_eq!(outcome["report"]["broken"].as_array().unwrap().len(), 0);
}

#[test]
fn map_renders_mermaid_and_writes_file() {
    let dir = TempDir::new().unwrap();
    seed_catalog(&dir);

    skillgraph(&dir)
        .arg("map")
        .assert()
        .success()
        .stdout(predicate::str::contains("```mermaid"))
        .stdout(predicate::str::contains("    style --> brief\n"));

    let out = dir.path().join("map.md");
    skillgraph(&dir)
        .args(["map", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 entries, 3 active, 1 cross-references"));
    let doc = std::fs::read_to_string(&out).unwrap();
    assert!(doc.contains("build[[\"build\"]]"));
    assert!(doc.contains("style build fill:#C0C0C0,color:#000,stroke-width:3px"));
}

#[test]
fn combos_fails_when_no_descriptor_can_be_written() {
    let dir = TempDir::new().unwrap();
    for name in ["plain", "notes"] {
        write(
            &dir.path().join(".agents/skills").join(name).join("SKILL.md"),
            "# no front matter\n",
        );
    }
    write(
        &dir.path().join(".claude/CLAUDE.md"),
        "### Skill Workflows\n| **Notes** | plain → notes | x |\n",
    );

    skillgraph(&dir)
        .arg("combos")
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed: 2"))
        .stderr(predicate::str::contains("no descriptor could be written: notes, plain"));
}
