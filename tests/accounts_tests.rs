//! Teacher accounts, recovery codes and course membership through the CLI

mod support;

use predicates::prelude::*;
use support::{outbox, register, rubrica, run_json, setup_store, OWNER, PASSWORD};

fn latest_code(dir: &tempfile::TempDir) -> String {
    let messages = outbox(dir);
    let text = messages.last().unwrap()["text"].as_str().unwrap().to_string();
    text.rsplit(": ").next().unwrap().trim().to_string()
}

#[test]
fn test_register_and_login() {
    let dir = setup_store();

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "login", OWNER, "--password", PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as owner@x.edu"));

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "login", OWNER, "--password", "nope"])
        .assert()
        .code(4);

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "register", "OWNER@x.edu", "--password", PASSWORD])
        .assert()
        .code(3);

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "register", "weak@x.edu", "--password", "short"])
        .assert()
        .code(2);
}

#[test]
fn test_password_from_environment() {
    let dir = setup_store();
    rubrica()
        .current_dir(dir.path())
        .env("RUBRICA_PASSWORD", PASSWORD)
        .args(["teacher", "login", OWNER])
        .assert()
        .success();
}

#[test]
fn test_recovery_code_resets_password() {
    let dir = setup_store();

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "recover", OWNER])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recovery code sent"));

    let code = latest_code(&dir);
    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "reset-password", OWNER, "--code", &code])
        .args(["--password", "Nueva#Clave9"])
        .assert()
        .success();

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "login", OWNER, "--password", "Nueva#Clave9"])
        .assert()
        .success();

    // the code was consumed
    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "reset-password", OWNER, "--code", &code])
        .args(["--password", "Otra#Clave10"])
        .assert()
        .code(4);
}

#[test]
fn test_change_email_with_code() {
    let dir = setup_store();
    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "recover", OWNER])
        .assert()
        .success();
    let code = latest_code(&dir);

    rubrica()
        .current_dir(dir.path())
        .args(["teacher", "change-email", OWNER, "--code", &code])
        .args(["--new-email", "nuevo@x.edu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nuevo@x.edu"));

    rubrica()
        .current_dir(dir.path())
        .args(["--as", "nuevo@x.edu", "course", "list"])
        .assert()
        .success();
}

#[test]
fn test_course_membership_flow() {
    let dir = setup_store();
    register(&dir, "other@x.edu");

    let course = run_json(
        &dir,
        &[
            "course",
            "create",
            "Bases de datos",
            "--teacher",
            "other@x.edu",
            "--teacher",
            "ghost@x.edu:moderator",
        ],
    );
    let id = course["id"].as_str().unwrap().to_string();
    assert_eq!(course["teachers"].as_array().unwrap().len(), 2);

    rubrica()
        .current_dir(dir.path())
        .args(["--as", OWNER, "course", "add-teacher", &id, "other@x.edu"])
        .assert()
        .code(3);

    let course = run_json(&dir, &["course", "set-moderator", &id, "other@x.edu"]);
    let other = course["teachers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["email"] == "other@x.edu")
        .unwrap()
        .clone();
    assert_eq!(other["moderator"], true);

    let course = run_json(&dir, &["course", "update", &id, "--name", "BD"]);
    assert_eq!(course["name"], "BD");

    run_json(&dir, &["course", "delete", &id]);
    let courses = run_json(&dir, &["course", "list"]);
    assert!(courses.as_array().unwrap().is_empty());
}

#[test]
fn test_group_roster_flow() {
    let dir = setup_store();
    let (_, group) = support::create_course_and_group(&dir, &["Ana <ana@x.edu>"]);

    let change = run_json(
        &dir,
        &["group", "add-student", &group, "Ana <ana@x.edu>", "Eva <eva@x.edu>"],
    );
    assert_eq!(change["added"], serde_json::json!(["eva@x.edu"]));
    assert_eq!(change["already_present"], serde_json::json!(["ana@x.edu"]));

    let student = run_json(
        &dir,
        &["group", "update-student", &group, "eva@x.edu", "--new-email", "eva.m@x.edu"],
    );
    assert_eq!(student["email"], "eva.m@x.edu");

    let renamed = run_json(&dir, &["group", "rename", &group, "G2"]);
    assert_eq!(renamed["name"], "G2");

    let after = run_json(&dir, &["group", "remove-student", &group, "ana@x.edu"]);
    assert_eq!(after["students"].as_array().unwrap().len(), 1);
}
