use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ctxi_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ctxi");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(files_dir.join("nested")).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Alpha\n\nRust programming with cargo crates and the borrow checker.",
    )
    .unwrap();
    fs::write(
        files_dir.join("nested/beta.md"),
        "Rust programming guide covering cargo crates and lifetimes.",
    )
    .unwrap();
    fs::write(
        files_dir.join("gamma.txt"),
        "Deployment notes about Kubernetes clusters and Docker images.",
    )
    .unwrap();
    fs::write(files_dir.join("ignored.rs"), "fn main() {}").unwrap();

    let config_content = format!(
        r#"[storage]
dir = "{}/data"

[retrieval]
limit = 10
threshold = 0.3

[ingest]
include_globs = ["**/*.md", "**/*.txt"]
"#,
        root.display()
    );

    let config_path = config_dir.join("ctxi.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ctxi(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ctxi_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ctxi binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn ingest(config: &Path, root: &Path) {
    let dir = root.join("files");
    let (stdout, stderr, ok) = run_ctxi(config, &["ingest", dir.to_str().unwrap()]);
    assert!(ok, "ingest failed: {}", stderr);
    assert!(stdout.contains("files indexed: 3"), "stdout: {}", stdout);
}

/// The first `id: ...` line of command output.
fn first_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("id: "))
        .map(str::to_string)
        .unwrap_or_else(|| panic!("no id in output: {}", stdout))
}

#[test]
fn test_ingest_writes_snapshots() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let data = tmp.path().join("data");
    assert!(data.join("index.json").exists());
    assert!(data.join("analytics.json").exists());

    let index = fs::read_to_string(data.join("index.json")).unwrap();
    assert!(index.contains("\"filesystem\""));
    assert!(!index.contains("fn main"));
}

#[test]
fn test_ingest_links_related_files() {
    let (tmp, config) = setup_test_env();
    let dir = tmp.path().join("files");
    let (stdout, _, ok) = run_ctxi(&config, &["ingest", dir.to_str().unwrap()]);
    assert!(ok);
    // alpha and beta share rust, programming, cargo, crates.
    assert!(stdout.contains("links discovered: 1"), "stdout: {}", stdout);
}

#[test]
fn test_search_ranks_and_filters() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(&config, &["search", "rust cargo"]);
    assert!(ok);
    assert!(stdout.starts_with("1. ["), "stdout: {}", stdout);
    assert!(stdout.contains("2. ["));
    assert!(!stdout.contains("Kubernetes"));

    let (stdout, _, ok) = run_ctxi(&config, &["search", "rust cargo", "--type", "txt"]);
    assert!(ok);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_empty_query() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(&config, &["search", "   "]);
    assert!(ok);
    assert!(stdout.contains("No results."));

    let analytics = fs::read_to_string(tmp.path().join("data/analytics.json")).unwrap();
    assert!(analytics.contains("\"searches\": []"));
}

#[test]
fn test_search_explain() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(&config, &["search", "kubernetes docker", "--explain"]);
    assert!(ok);
    assert!(stdout.contains("score: similarity"));
}

#[test]
fn test_search_invalid_date() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (_, stderr, ok) = run_ctxi(&config, &["search", "rust", "--since", "yesterday"]);
    assert!(!ok);
    assert!(stderr.contains("YYYY-MM-DD"));
}

#[test]
fn test_click_and_context_show_in_stats() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(
        &config,
        &["context", "kubernetes deployment", "--source", "chat"],
    );
    assert!(ok);
    let id = first_id(&stdout);

    let (stdout, _, ok) = run_ctxi(&config, &["click", &id]);
    assert!(ok);
    assert!(stdout.contains("Recorded interaction"));

    let (stdout, _, ok) = run_ctxi(&config, &["stats"]);
    assert!(ok);
    assert!(stdout.contains("Chunks:      3"));
    assert!(stdout.contains("Links:       1"));
    assert!(stdout.contains("Searches:    1"));
    assert!(stdout.contains(&id));

    let analytics = fs::read_to_string(tmp.path().join("data/analytics.json")).unwrap();
    assert!(analytics.contains("\"chat\""));
}

#[test]
fn test_click_unknown_chunk_fails() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (_, stderr, ok) = run_ctxi(&config, &["click", "no_such_chunk"]);
    assert!(!ok);
    assert!(stderr.contains("Chunk not found"));
}

#[test]
fn test_links_and_delete() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(&config, &["search", "borrow checker"]);
    assert!(ok);
    let alpha = first_id(&stdout);

    let (stdout, _, ok) = run_ctxi(&config, &["links", &alpha]);
    assert!(ok);
    assert!(stdout.contains("--- Links (1) ---"), "stdout: {}", stdout);
    assert!(stdout.contains("shared: rust, programming, cargo, crates"));

    let (stdout, _, ok) = run_ctxi(&config, &["delete", &alpha]);
    assert!(ok);
    assert!(stdout.contains("Deleted chunk"));

    let (stdout, _, ok) = run_ctxi(&config, &["stats"]);
    assert!(ok);
    assert!(stdout.contains("Chunks:      2"));
    assert!(stdout.contains("Links:       0"));

    let (_, _, ok) = run_ctxi(&config, &["links", &alpha]);
    assert!(!ok);
}

#[test]
fn test_delete_by_source_and_clear() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let note = tmp.path().join("note.txt");
    fs::write(&note, "Meeting notes about quarterly planning.").unwrap();
    let (stdout, _, ok) = run_ctxi(
        &config,
        &["index", note.to_str().unwrap(), "--source", "notes"],
    );
    assert!(ok);
    assert!(stdout.contains("chunks written: 1"));

    let (stdout, _, ok) = run_ctxi(&config, &["delete", "--source", "filesystem"]);
    assert!(ok);
    assert!(stdout.contains("Deleted 3 chunks"));

    let (stdout, _, ok) = run_ctxi(&config, &["stats"]);
    assert!(ok);
    assert!(stdout.contains("Chunks:      1"));

    let (stdout, _, ok) = run_ctxi(&config, &["clear"]);
    assert!(ok);
    assert!(stdout.contains("Index cleared."));
    let (stdout, _, _) = run_ctxi(&config, &["stats"]);
    assert!(stdout.contains("Chunks:      0"));
}

#[test]
fn test_suggest_excludes_current_source() {
    let (tmp, config) = setup_test_env();
    ingest(&config, tmp.path());

    let (stdout, _, ok) = run_ctxi(&config, &["suggest", "--source", "chat", "docker", "images"]);
    assert!(ok);
    assert!(stdout.contains("filesystem / txt"), "stdout: {}", stdout);

    let (stdout, _, ok) = run_ctxi(
        &config,
        &["suggest", "--source", "filesystem", "docker", "images"],
    );
    assert!(ok);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, ok) = run_ctxi(&tmp.path().join("nope.toml"), &["stats"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_corrupt_snapshot_recovers() {
    let (tmp, config) = setup_test_env();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("index.json"), "not json at all").unwrap();

    let (stdout, stderr, ok) = run_ctxi(&config, &["stats"]);
    assert!(ok, "stderr: {}", stderr);
    assert!(stdout.contains("Chunks:      0"));
    assert!(stderr.contains("index snapshot unreadable"));
}
