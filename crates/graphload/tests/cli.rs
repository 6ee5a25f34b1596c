use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("temp home"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }

    fn database(&self) -> PathBuf {
        self.path("graph.kuzu")
    }

    fn write_result(&self, name: &str, nodes: Value, edges: Value) -> PathBuf {
        let path = self.path(name);
        let result = json!({
            "message": "Analysis complete. Triples extracted, deduplicated, and transformed.",
            "sourcePath": "/tmp/uploads/demo",
            "discoveredProjects": ["/tmp/uploads/demo/Demo.csproj"],
            "analyzedProjectCount": 1,
            "collectedTriplesCount": 3,
            "deduplicatedTriplesCount": 3,
            "nodes": nodes,
            "edges": edges,
            "artifact": {
                "metadata": {
                    "runId": "2c9d",
                    "sourcePath": "/tmp/uploads/demo",
                    "startTime": "2025-05-01T12:00:00Z"
                },
                "logEntries": [{ "timestamp": "2025-05-01T12:00:01Z", "message": "Getting Roslyn analysis context." }]
            }
        });
        std::fs::write(&path, result.to_string()).expect("write result");
        path
    }

    fn demo_result(&self) -> PathBuf {
        self.write_result(
            "result.json",
            json!([
                { "id": "f1", "label": "File", "name": "OrderService.cs", "fullName": "Demo/OrderService.cs" },
                { "id": "c1", "label": "Class", "name": "OrderService", "fullName": "Demo.OrderService" },
                { "id": "c2", "label": "Class", "name": "UserRepository", "fullName": "Demo.UserRepository" }
            ]),
            json!([
                { "source": "c1", "target": "f1", "type": "DECLARED_AT" },
                { "source": "c1", "target": "c2", "type": "USE" }
            ]),
        )
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("graphload").expect("cargo bin graphload");
        cmd.env("HOME", self.home.path())
            .env_remove("GRAPHLOAD_DATABASE")
            .env_remove("GRAPHLOAD_ENDPOINT")
            .env_remove("RUST_LOG")
            .arg("--database")
            .arg(self.database());
        cmd
    }

    fn stats(&self) -> Value {
        let output = self
            .command()
            .args(["stats", "--json"])
            .output()
            .expect("run stats");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("stats json")
    }
}

fn load(workspace: &Workspace, input: &Path) -> assert_cmd::assert::Assert {
    workspace.command().arg("load").arg("--input").arg(input).assert()
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("graphload")
        .expect("cargo bin graphload")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("analyze")
                .and(predicate::str::contains("load"))
                .and(predicate::str::contains("stats"))
                .and(predicate::str::contains("search")),
        );
}

#[test]
fn load_then_stats_reports_counts() {
    let workspace = Workspace::new();
    let input = workspace.demo_result();

    load(&workspace, &input)
        .success()
        .stderr(predicate::str::contains("Nodes written: 3"));

    let stats = workspace.stats();
    assert_eq!(stats["nodes"], 3);
    assert_eq!(stats["relationships"], 2);
    assert_eq!(stats["nodes_by_label"]["Class"], 2);
}

#[test]
fn duplicate_ids_fail_and_keep_previous_graph() {
    let workspace = Workspace::new();
    load(&workspace, &workspace.demo_result()).success();

    let duplicates = workspace.write_result(
        "duplicates.json",
        json!([
            { "id": "x", "label": "File", "name": "A.cs", "fullName": "A.cs" },
            { "id": "x", "label": "File", "name": "B.cs", "fullName": "B.cs" }
        ]),
        json!([]),
    );
    load(&workspace, &duplicates)
        .failure()
        .stderr(
            predicate::str::contains("Duplicate node ids")
                .and(predicate::str::contains("validate"))
                .and(predicate::str::contains("the stored graph was not modified")),
        );

    assert_eq!(workspace.stats()["nodes"], 3);
}

#[test]
fn unusable_label_fails_and_keeps_previous_graph() {
    let workspace = Workspace::new();
    load(&workspace, &workspace.demo_result()).success();

    let clashing = workspace.write_result(
        "clashing.json",
        json!([
            { "id": "a", "label": "Class", "name": "A", "fullName": "A" },
            { "id": "b", "label": "class", "name": "B", "fullName": "B" }
        ]),
        json!([]),
    );
    load(&workspace, &clashing).failure().stderr(
        predicate::str::contains("share one table")
            .and(predicate::str::contains("the stored graph was not modified")),
    );

    assert_eq!(workspace.stats()["nodes"], 3);
}

#[test]
fn stats_on_missing_database_fails_without_creating_it() {
    let workspace = Workspace::new();

    workspace
        .command()
        .args(["stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No database at"));

    assert!(!workspace.database().exists());
}

#[test]
fn dangling_edge_policy_from_flag() {
    let workspace = Workspace::new();
    let dangling = workspace.write_result(
        "dangling.json",
        json!([{ "id": "a", "label": "Class", "name": "A", "fullName": "A" }]),
        json!([{ "source": "a", "target": "zzz", "type": "HAVE" }]),
    );

    load(&workspace, &dangling)
        .failure()
        .stderr(predicate::str::contains("reference unknown nodes"));

    workspace
        .command()
        .args(["load", "--dangling", "drop", "--input"])
        .arg(&dangling)
        .assert()
        .success();
    let stats = workspace.stats();
    assert_eq!(stats["nodes"], 1);
    assert_eq!(stats["relationships"], 0);
}

#[test]
fn dry_run_does_not_create_database() {
    let workspace = Workspace::new();
    let artifact = workspace.path("artifact.json");

    workspace
        .command()
        .args(["load", "--dry-run", "--input"])
        .arg(workspace.demo_result())
        .arg("--artifact-out")
        .arg(&artifact)
        .assert()
        .success()
        .stderr(predicate::str::contains("Dry run: 3 nodes and 2 relationships"));

    assert!(!workspace.database().exists());
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(artifact).unwrap()).unwrap();
    assert_eq!(saved["metadata"]["runId"], "2c9d");
}

#[test]
fn index_then_search_returns_best_match_first() {
    let workspace = Workspace::new();
    let index = workspace.path("index.json");

    workspace
        .command()
        .args(["index", "--embedder", "hashing", "--label", "Class", "--input"])
        .arg(workspace.demo_result())
        .arg("--out")
        .arg(&index)
        .assert()
        .success();

    let output = workspace
        .command()
        .args(["search", "user repository", "--json", "--top-k", "1", "--index"])
        .arg(&index)
        .output()
        .expect("run search");
    assert!(output.status.success());
    let hits: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["metadata"]["id"], "c2");
    assert_eq!(hits[0]["metadata"]["fullName"], "Demo.UserRepository");
}

#[test]
fn index_rejects_dimension_for_model_embedder() {
    let workspace = Workspace::new();

    workspace
        .command()
        .args(["index", "--embedder", "fastembed", "--dimension", "64", "--input"])
        .arg(workspace.demo_result())
        .arg("--out")
        .arg(workspace.path("index.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dimension only applies to the hashing embedder"));
}

#[test]
fn analyze_without_endpoint_fails() {
    let workspace = Workspace::new();

    workspace
        .command()
        .args(["analyze", "src.zip", "--out"])
        .arg(workspace.path("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No analyzer endpoint configured"));
}

#[test]
fn config_file_supplies_defaults() {
    let workspace = Workspace::new();
    let config_dir = workspace.path(".graphload");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[load]\ndangling = \"drop\"\n").unwrap();
    let dangling = workspace.write_result(
        "dangling.json",
        json!([{ "id": "a", "label": "Class", "name": "A", "fullName": "A" }]),
        json!([{ "source": "a", "target": "zzz", "type": "HAVE" }]),
    );

    load(&workspace, &dangling).success();
}
