use assert_cmd::{cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

pub const OWNER: &str = "owner@x.edu";
pub const PASSWORD: &str = "Secreto#2024";

/// Get a Command for rubrica, isolated from the caller's environment
pub fn rubrica() -> Command {
    let mut cmd = cargo_bin_cmd!("rubrica");
    cmd.env_remove("RUBRICA_STORE")
        .env_remove("RUBRICA_AS")
        .env_remove("RUBRICA_PASSWORD")
        .env_remove("RUBRICA_MAIL_ENDPOINT")
        .env_remove("RUST_LOG")
        .env_remove("RUBRICA_LOG");
    cmd
}

/// Initialize a store and register the owner account
pub fn setup_store() -> TempDir {
    let dir = TempDir::new().unwrap();
    rubrica()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    register(&dir, OWNER);
    dir
}

/// Register a teacher with the shared test password
pub fn register(dir: &TempDir, email: &str) {
    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "register", email, "--password", PASSWORD])
        .assert()
        .success();
}

/// Run a command as `actor` with JSON output and parse stdout
pub fn run_json_as(dir: &TempDir, actor: &str, args: &[&str]) -> Value {
    let output = rubrica()
        .current_dir(dir.path())
        .args(["--format", "json", "--as", actor])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

/// Run a command as the owner with JSON output
pub fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    run_json_as(dir, OWNER, args)
}

/// Write a JSON document into the test directory and return its path
pub fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path_str(&path)
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Messages written to the store outbox, oldest first
#[allow(dead_code)]
pub fn outbox(dir: &TempDir) -> Vec<Value> {
    let outbox = dir.path().join(".rubrica").join("outbox");
    let mut paths: Vec<_> = std::fs::read_dir(outbox)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default();
    paths.sort();
    paths
        .iter()
        .map(|p| serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap())
        .collect()
}

/// Create a course with one group holding the given students; returns (course, group)
#[allow(dead_code)]
pub fn create_course_and_group(dir: &TempDir, students: &[&str]) -> (String, String) {
    let course = run_json(dir, &["course", "create", "Redes"]);
    let course_id = course["id"].as_str().unwrap().to_string();

    let mut args = vec!["group", "create", course_id.as_str(), "G1"];
    for student in students {
        args.push("--student");
        args.push(student);
    }
    let group = run_json(dir, &args);
    (course_id, group["id"].as_str().unwrap().to_string())
}

/// Create a single-criterion rubric and return its id
#[allow(dead_code)]
pub fn create_rubric(dir: &TempDir, name: &str) -> String {
    let input = serde_json::json!({
        "name": name,
        "topics": [{ "name": "T1", "criteria": [{ "label": "C1", "weight": 0 }] }]
    });
    let file = write_json(dir, &format!("{}.json", name), &input);
    let rubric = run_json(dir, &["rubric", "create", &file]);
    rubric["id"].as_str().unwrap().to_string()
}

/// Submit `weight x score` for one student and return the command's JSON output
#[allow(dead_code)]
pub fn grade(
    dir: &TempDir,
    group_id: &str,
    number: &str,
    email: &str,
    weight: f64,
    score: f64,
) -> Value {
    let input = serde_json::json!({
        "student_email": email,
        "topics": [{ "name": "T1", "criteria": [{ "label": "C1", "weight": weight, "score": score }] }]
    });
    let file = write_json(dir, &format!("grade-{}-{}.json", number, email), &input);
    run_json(dir, &["nota", "grade", group_id, number, &file])
}
