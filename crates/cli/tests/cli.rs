use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(docs.join("nested")).unwrap();
    fs::write(docs.join("cats.txt"), "The Cat sat.\nThe cat RAN.\n").unwrap();
    fs::write(docs.join("nested/dogs.text"), "Dogs chase cats and catalogs").unwrap();
    fs::write(docs.join("nested/notes.md"), "cat cat cat").unwrap();
    fs::write(dir.path().join("queries.txt"), "cat\n  DOG  \nbird\n\ncat\n").unwrap();
    dir
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn sift(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sift").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn builds_exports_and_answers_queries_with_threads() {
    let dir = corpus();
    sift(&dir)
        .args(["--input", "docs", "--threads", "3", "--index", "--query", "queries.txt", "--results"])
        .assert()
        .success();

    let index = read_json(&dir.path().join("index.json"));
    let cats = Path::new("docs").join("cats.txt").to_string_lossy().into_owned();
    assert_eq!(index["cat"][&cats], json!([2, 5]));
    assert_eq!(index["the"][&cats], json!([1, 4]));
    assert!(index.get("catcat").is_none());

    let raw = fs::read_to_string(dir.path().join("results.json")).unwrap();
    let offsets: Vec<usize> = ["\"cat\": [", "\"DOG\": [", "\"bird\": [", "\"\": ["]
        .iter()
        .map(|key| raw.find(key).unwrap())
        .collect();
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]), "{raw}");

    let results: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(results.as_object().unwrap().len(), 4);
    assert_eq!(results["cat"][0], json!({ "where": cats, "count": 2, "index": 2 }));
    assert_eq!(results["cat"].as_array().unwrap().len(), 2);
    assert_eq!(results["bird"], json!([]));
}

#[test]
fn sequential_and_concurrent_runs_agree() {
    let dir = corpus();
    sift(&dir)
        .args(["--input", "docs", "--index", "seq-index.json", "--query", "queries.txt"])
        .args(["--results", "seq-results.json"])
        .assert()
        .success();
    sift(&dir)
        .args(["--input", "docs", "--threads", "--index", "par-index.json"])
        .args(["--query", "queries.txt", "--results", "par-results.json"])
        .assert()
        .success();

    assert_eq!(
        read_json(&dir.path().join("seq-index.json")),
        read_json(&dir.path().join("par-index.json"))
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("seq-results.json")).unwrap(),
        fs::read_to_string(dir.path().join("par-results.json")).unwrap()
    );
}

#[test]
fn config_file_changes_extensions() {
    let dir = corpus();
    fs::write(dir.path().join("sift.toml"), "[indexer]\nextensions = [\"md\"]\n").unwrap();
    sift(&dir)
        .args(["--config", "sift.toml", "--input", "docs", "--index", "md.json"])
        .assert()
        .success();

    let index = read_json(&dir.path().join("md.json"));
    assert_eq!(index.as_object().unwrap().len(), 1);
    assert_eq!(index["cat"].as_object().unwrap().len(), 1);
}

#[test]
fn invalid_thread_count_is_rejected() {
    let dir = corpus();
    sift(&dir)
        .args(["--input", "docs", "--threads", "0", "--index"])
        .assert()
        .failure();
    assert!(!dir.path().join("index.json").exists());
}

#[test]
fn input_and_seed_are_mutually_exclusive() {
    let dir = corpus();
    sift(&dir)
        .args(["--input", "docs", "--seed", "http://localhost/"])
        .assert()
        .failure();
}

#[test]
fn missing_input_still_runs_later_phases() {
    let dir = corpus();
    sift(&dir)
        .args(["--input", "absent", "--index", "--query", "queries.txt", "--results"])
        .assert()
        .failure();

    assert_eq!(read_json(&dir.path().join("index.json")), json!({}));
    let results = read_json(&dir.path().join("results.json"));
    assert_eq!(results["cat"], json!([]));
}

#[test]
fn zero_link_limit_fails_the_crawl_phase() {
    let dir = corpus();
    fs::write(dir.path().join("sift.toml"), "[crawler]\nmax_links = 0\n").unwrap();
    sift(&dir)
        .args(["--config", "sift.toml", "--seed", "http://127.0.0.1:9/", "--index"])
        .assert()
        .failure();

    assert_eq!(read_json(&dir.path().join("index.json")), json!({}));
}
