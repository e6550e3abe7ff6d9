use std::sync::Barrier;

use tempfile::{tempdir, TempDir};

use crate::config::StoreConfig;
use crate::error::RubricaError;
use crate::mail::{Attachment, OutboxMailer};
use crate::roster::{Course, Group, MemberRequest, NewNota, NewStudent, Teacher};
use crate::rubric::{Criterion, NewRubric, Rubric, RubricState, Scope, Topic};
use crate::store::{
    paths, GradeSubmission, NewCourse, NewGroup, StudentGrade, Store, StudentUpdate, CONFIG_FILE,
    DEFAULT_STORE_DIR,
};

const PASSWORD: &str = "Secreto#2024";

struct Fixture {
    _dir: TempDir,
    store: Store,
    owner: Teacher,
    course: Course,
    group: Group,
}

fn student(name: &str, email: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        email: email.to_string(),
    }
}

/// Store with one course, one group owned by `owner` and two students
fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let store = Store::init(dir.path()).unwrap();
    let owner = store.register_teacher("owner@x.edu", PASSWORD).unwrap();

    let course = store
        .create_course(
            &owner,
            NewCourse {
                name: "Redes".into(),
                icon: "i-net".into(),
                teachers: vec![],
            },
        )
        .unwrap();

    let group = store
        .create_group(
            &owner,
            NewGroup {
                course_id: course.id.clone(),
                name: "G1".into(),
                students: vec![student("Ana", "ana@x.edu"), student("Leo", "leo@x.edu")],
            },
        )
        .unwrap();

    Fixture {
        _dir: dir,
        store,
        owner,
        course,
        group,
    }
}

/// Template whose raw score is `weight * score` once filled
fn rubric_input(name: &str) -> NewRubric {
    NewRubric {
        name: name.to_string(),
        topics: vec![Topic::new("T1", vec![Criterion::new("C1", 0.0)])],
    }
}

fn filled(weight: f64, score: f64) -> Vec<Topic> {
    vec![Topic::new("T1", vec![Criterion::new("C1", weight).scored(score)])]
}

fn nota(number: u32, rubric: &Rubric, percentage: f64) -> NewNota {
    NewNota {
        number: Some(number),
        rubric_id: Some(rubric.id.clone()),
        date: Some("2024-03-01".into()),
        percentage: Some(percentage),
    }
}

fn submission(email: &str, topics: Vec<Topic>) -> GradeSubmission {
    GradeSubmission {
        student_email: email.to_string(),
        topics,
        remarks: String::new(),
    }
}

fn average_of(store: &Store, group_id: &str, email: &str) -> f64 {
    store
        .load_group(group_id)
        .unwrap()
        .student(email)
        .unwrap()
        .average
}

#[test]
fn test_init_and_discover() {
    let dir = tempdir().unwrap();
    let store = Store::init(dir.path()).unwrap();
    assert!(store.root().join(CONFIG_FILE).exists());
    assert!(store.root().join(crate::db::DB_FILE).exists());

    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    let discovered = Store::discover(&nested).unwrap();
    assert_eq!(discovered.root(), dir.path().join(DEFAULT_STORE_DIR));
}

#[test]
fn test_discover_without_store() {
    let dir = tempdir().unwrap();
    let err = paths::discover_store(dir.path()).unwrap_err();
    assert!(matches!(err, RubricaError::StoreNotFound { .. }));
}

#[test]
fn test_init_keeps_existing_config() {
    let dir = tempdir().unwrap();
    let store = Store::init(dir.path()).unwrap();
    let config_path = store.root().join(CONFIG_FILE);
    let config = StoreConfig {
        grading: crate::config::GradingConfig {
            strict_weights: true,
        },
        ..Default::default()
    };
    config.save(&config_path).unwrap();
    drop(store);

    let store = Store::init(dir.path()).unwrap();
    assert!(store.config().grading.strict_weights);
}

#[test]
fn test_register_and_login() {
    let f = fixture();
    let err = f.store.register_teacher("Owner@X.edu", PASSWORD).unwrap_err();
    assert_eq!(err.status(), 409);

    let weak = f.store.register_teacher("weak@x.edu", "abc").unwrap_err();
    assert_eq!(weak.status(), 400);

    let teacher = f.store.login("OWNER@x.edu", PASSWORD).unwrap();
    assert_eq!(teacher.id, f.owner.id);

    let err = f.store.login("owner@x.edu", "wrong").unwrap_err();
    assert_eq!(err.status(), 403);
}

fn last_code(store: &Store) -> String {
    let messages = OutboxMailer::new(store.outbox_dir()).messages().unwrap();
    let text = messages.last().unwrap()["text"].as_str().unwrap().to_string();
    text.rsplit(": ").next().unwrap().trim().to_string()
}

#[test]
fn test_password_reset_with_code() {
    let f = fixture();
    let request = f.store.request_recovery_code("owner@x.edu").unwrap();
    assert_eq!(request.email, "owner@x.edu");

    let code = last_code(&f.store);
    assert_eq!(code.len(), 6);

    let err = f
        .store
        .reset_password("owner@x.edu", "not-it", "Nuevo#2025")
        .unwrap_err();
    assert_eq!(err.status(), 403);

    f.store
        .reset_password("owner@x.edu", &code, "Nuevo#2025")
        .unwrap();
    assert!(f.store.login("owner@x.edu", "Nuevo#2025").is_ok());
    assert!(f.store.login("owner@x.edu", PASSWORD).is_err());

    // codes are single use
    let err = f
        .store
        .reset_password("owner@x.edu", &code, "Otro#20255")
        .unwrap_err();
    assert_eq!(err.status(), 403);
}

#[test]
fn test_expired_code_is_dropped_on_use() {
    let dir = tempdir().unwrap();
    let store_root = dir.path().join(DEFAULT_STORE_DIR);
    std::fs::create_dir_all(&store_root).unwrap();
    StoreConfig {
        recovery: crate::config::RecoveryConfig {
            code_ttl_secs: 0,
            code_length: 6,
        },
        ..Default::default()
    }
    .save(&store_root.join(CONFIG_FILE))
    .unwrap();

    let store = Store::open(&store_root).unwrap();
    store.register_teacher("owner@x.edu", PASSWORD).unwrap();
    store.request_recovery_code("owner@x.edu").unwrap();
    let code = last_code(&store);

    let err = store
        .reset_password("owner@x.edu", &code, "Nuevo#2025")
        .unwrap_err();
    assert_eq!(err.status(), 403);

    let remaining: i64 = store
        .db()
        .conn()
        .query_row("SELECT COUNT(*) FROM recovery_codes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(store.login("owner@x.edu", PASSWORD).is_ok());
}

#[test]
fn test_recovery_for_unknown_email() {
    let f = fixture();
    let err = f.store.request_recovery_code("nobody@x.edu").unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn test_change_email_with_code() {
    let f = fixture();
    f.store.register_teacher("taken@x.edu", PASSWORD).unwrap();
    f.store.request_recovery_code("owner@x.edu").unwrap();
    let code = last_code(&f.store);

    let err = f
        .store
        .change_email("owner@x.edu", &code, "taken@x.edu")
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let teacher = f
        .store
        .change_email("owner@x.edu", &code, "new@x.edu")
        .unwrap();
    assert_eq!(teacher.email, "new@x.edu");
    assert!(f.store.login("new@x.edu", PASSWORD).is_ok());
}

#[test]
fn test_course_creation_and_membership() {
    let f = fixture();
    let other = f.store.register_teacher("other@x.edu", PASSWORD).unwrap();

    let err = f
        .store
        .create_course(
            &f.owner,
            NewCourse {
                name: "Redes".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let course = f
        .store
        .create_course(
            &f.owner,
            NewCourse {
                name: "Bases de datos".into(),
                icon: String::new(),
                teachers: vec![
                    MemberRequest {
                        email: "other@x.edu".into(),
                        moderator: false,
                    },
                    MemberRequest {
                        email: "ghost@x.edu".into(),
                        moderator: true,
                    },
                ],
            },
        )
        .unwrap();
    assert_eq!(course.teachers.len(), 2);
    assert!(course.is_moderator(&f.owner.id));
    assert!(!course.is_moderator(&other.id));

    let err = f
        .store
        .add_course_teachers(
            &f.owner,
            &course.id,
            &[MemberRequest {
                email: "other@x.edu".into(),
                moderator: false,
            }],
        )
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let third = f.store.register_teacher("third@x.edu", PASSWORD).unwrap();
    let change = f
        .store
        .add_course_teachers(
            &f.owner,
            &course.id,
            &[
                MemberRequest {
                    email: "other@x.edu".into(),
                    moderator: false,
                },
                MemberRequest {
                    email: "third@x.edu".into(),
                    moderator: false,
                },
            ],
        )
        .unwrap();
    assert_eq!(change.added, vec!["third@x.edu".to_string()]);
    assert_eq!(change.already_present, vec!["other@x.edu".to_string()]);

    // plain members cannot moderate
    let err = f
        .store
        .set_course_moderator(&third, &course.id, "other@x.edu", true)
        .unwrap_err();
    assert_eq!(err.status(), 403);

    let course = f
        .store
        .set_course_moderator(&f.owner, &course.id, "third@x.edu", true)
        .unwrap();
    assert!(course.is_moderator(&third.id));

    let course = f
        .store
        .remove_course_teacher(&third, &course.id, "other@x.edu")
        .unwrap();
    assert!(course.member(&other.id).is_none());

    let renamed = f
        .store
        .update_course(&f.owner, &course.id, Some("BD"), None)
        .unwrap();
    assert_eq!(renamed.name, "BD");
    assert_eq!(renamed.icon, "");
}

#[test]
fn test_group_roster() {
    let f = fixture();

    let err = f
        .store
        .create_group(
            &f.owner,
            NewGroup {
                course_id: f.course.id.clone(),
                name: "G1".into(),
                students: vec![],
            },
        )
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let err = f
        .store
        .add_students(&f.owner, &f.group.id, &[student("Ana", "ana@x.edu")])
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let change = f
        .store
        .add_students(
            &f.owner,
            &f.group.id,
            &[student("Ana", "ana@x.edu"), student("Eva", "eva@x.edu")],
        )
        .unwrap();
    assert_eq!(change.added, vec!["eva@x.edu".to_string()]);
    assert_eq!(change.group.students.len(), 3);

    let updated = f
        .store
        .update_student(
            &f.owner,
            &f.group.id,
            "eva@x.edu",
            StudentUpdate {
                name: Some("Eva María".into()),
                email: None,
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Eva María");

    let err = f
        .store
        .update_student(
            &f.owner,
            &f.group.id,
            "eva@x.edu",
            StudentUpdate {
                name: None,
                email: Some("ana@x.edu".into()),
            },
        )
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let group = f.store.remove_student(&f.owner, &f.group.id, "eva@x.edu").unwrap();
    assert_eq!(group.students.len(), 2);

    let groups = f.store.list_groups(&f.owner, &f.course.id, true).unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_section_scenario_sum_of_weighted_finals() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("Parcial 1")).unwrap();
    let r2 = f.store.create_rubric(&f.owner, rubric_input("Parcial 2")).unwrap();

    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 50.0)).unwrap();
    let grade = f
        .store
        .submit_grade(&f.owner, &f.group.id, 1, submission("ana@x.edu", filled(40.0, 2.0)))
        .unwrap();
    assert_eq!(grade.calificacion.raw_score, 80.0);
    assert_eq!(grade.calificacion.final_score, 40.0);
    assert_eq!(grade.average, 40.0);

    f.store.create_nota(&f.owner, &f.group.id, &nota(2, &r2, 50.0)).unwrap();
    let grade = f
        .store
        .submit_grade(&f.owner, &f.group.id, 2, submission("ana@x.edu", filled(20.0, 3.0)))
        .unwrap();
    assert_eq!(grade.calificacion.final_score, 30.0);
    assert_eq!(grade.average, 70.0);

    f.store.delete_nota(&f.owner, &f.group.id, 1).unwrap();
    assert_eq!(average_of(&f.store, &f.group.id, "ana@x.edu"), 30.0);
}

#[test]
fn test_resubmission_replaces_whole_entry() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("Taller")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 100.0)).unwrap();

    let mut first = submission("ana@x.edu", filled(10.0, 5.0));
    first.remarks = "primera".into();
    f.store.submit_grade(&f.owner, &f.group.id, 1, first).unwrap();

    let second = submission(
        "ana@x.edu",
        vec![Topic::new("Otro", vec![Criterion::new("X", 3.0).scored(3.0)])],
    );
    f.store.submit_grade(&f.owner, &f.group.id, 1, second).unwrap();

    let group = f.store.load_group(&f.group.id).unwrap();
    let ana = group.student("ana@x.edu").unwrap();
    assert_eq!(ana.calificaciones.len(), 1);
    let stored = &ana.calificaciones[0];
    assert_eq!(stored.topics[0].name, "Otro");
    assert_eq!(stored.topics[0].criteria[0].accumulated, Some(9.0));
    assert_eq!(stored.remarks, "");
    assert_eq!(ana.average, 9.0);
}

#[test]
fn test_reweight_recomputes_from_snapshot() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("Proyecto")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 50.0)).unwrap();
    f.store
        .submit_grade(&f.owner, &f.group.id, 1, submission("ana@x.edu", filled(40.0, 2.0)))
        .unwrap();
    f.store
        .submit_grade(&f.owner, &f.group.id, 1, submission("leo@x.edu", filled(33.0, 1.0)))
        .unwrap();

    let change = f
        .store
        .update_nota_percentage(&f.owner, &f.group.id, 1, 25.0)
        .unwrap();
    assert_eq!(change.nota.percentage, 25.0);
    assert_eq!(change.affected_students.len(), 2);

    let group = f.store.load_group(&f.group.id).unwrap();
    let ana = group.student("ana@x.edu").unwrap();
    assert_eq!(ana.calificaciones[0].raw_score, 80.0);
    assert_eq!(ana.calificaciones[0].final_score, 20.0);
    assert_eq!(ana.average, 20.0);
    let leo = group.student("leo@x.edu").unwrap();
    assert_eq!(leo.calificaciones[0].final_score, 8.25);

    let err = f
        .store
        .update_nota_percentage(&f.owner, &f.group.id, 1, 120.0)
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[test]
fn test_delete_nota_only_removes_matching_grades() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    let r2 = f.store.create_rubric(&f.owner, rubric_input("B")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 50.0)).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(2, &r2, 50.0)).unwrap();

    for email in ["ana@x.edu", "leo@x.edu"] {
        for number in [1, 2] {
            f.store
                .submit_grade(&f.owner, &f.group.id, number, submission(email, filled(10.0, 1.0)))
                .unwrap();
        }
    }

    let change = f.store.delete_nota(&f.owner, &f.group.id, 1).unwrap();
    assert_eq!(change.affected_students.len(), 2);

    let group = f.store.load_group(&f.group.id).unwrap();
    assert_eq!(group.notas.len(), 1);
    for student in &group.students {
        assert_eq!(student.calificaciones.len(), 1);
        assert_eq!(student.calificaciones[0].rubric_id, r2.id);
        assert_eq!(student.average, 5.0);
    }

    let err = f.store.delete_nota(&f.owner, &f.group.id, 1).unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn test_revert_and_fetch_student_grade() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 50.0)).unwrap();

    let grade = f
        .store
        .get_student_grade(&f.owner, &f.group.id, 1, "ana@x.edu")
        .unwrap();
    assert!(matches!(grade, StudentGrade::Empty { ref topics } if topics.is_empty()));

    f.store
        .submit_grade(&f.owner, &f.group.id, 1, submission("ana@x.edu", filled(40.0, 2.0)))
        .unwrap();
    let grade = f
        .store
        .get_student_grade(&f.owner, &f.group.id, 1, "ana@x.edu")
        .unwrap();
    assert!(matches!(grade, StudentGrade::Recorded(ref c) if c.final_score == 40.0));

    let average = f.store.revert_grade(&f.owner, &f.group.id, 1, "ana@x.edu").unwrap();
    assert_eq!(average, 0.0);

    let err = f
        .store
        .revert_grade(&f.owner, &f.group.id, 1, "ana@x.edu")
        .unwrap_err();
    assert_eq!(err.status(), 404);

    let err = f
        .store
        .submit_grade(&f.owner, &f.group.id, 1, submission("nadie@x.edu", filled(1.0, 1.0)))
        .unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn test_create_nota_validation() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();

    let mut missing = nota(1, &r1, 50.0);
    missing.date = None;
    let err = f.store.create_nota(&f.owner, &f.group.id, &missing).unwrap_err();
    assert_eq!(err.status(), 400);

    let err = f
        .store
        .create_nota(&f.owner, &f.group.id, &nota(1, &r1, -1.0))
        .unwrap_err();
    assert_eq!(err.status(), 400);

    let mut ghost = nota(1, &r1, 10.0);
    ghost.rubric_id = Some("rb-missing".into());
    let err = f.store.create_nota(&f.owner, &f.group.id, &ghost).unwrap_err();
    assert_eq!(err.status(), 404);

    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 10.0)).unwrap();
    let err = f
        .store
        .create_nota(&f.owner, &f.group.id, &nota(1, &r1, 10.0))
        .unwrap_err();
    assert_eq!(err.status(), 409);

    // one nota per rubric in a group
    let err = f
        .store
        .create_nota(&f.owner, &f.group.id, &nota(2, &r1, 10.0))
        .unwrap_err();
    assert_eq!(err.status(), 409);

    let group = f.store.load_group(&f.group.id).unwrap();
    assert_eq!(group.rubric_ids, vec![r1.id.clone()]);
}

#[test]
fn test_strict_weights_caps_total() {
    let dir = tempdir().unwrap();
    let store_root = dir.path().join(DEFAULT_STORE_DIR);
    std::fs::create_dir_all(&store_root).unwrap();
    StoreConfig {
        grading: crate::config::GradingConfig {
            strict_weights: true,
        },
        ..Default::default()
    }
    .save(&store_root.join(CONFIG_FILE))
    .unwrap();

    let store = Store::open(&store_root).unwrap();
    let owner = store.register_teacher("owner@x.edu", PASSWORD).unwrap();
    let course = store
        .create_course(
            &owner,
            NewCourse {
                name: "C".into(),
                ..Default::default()
            },
        )
        .unwrap();
    let group = store
        .create_group(
            &owner,
            NewGroup {
                course_id: course.id,
                name: "G".into(),
                students: vec![],
            },
        )
        .unwrap();
    let r1 = store.create_rubric(&owner, rubric_input("A")).unwrap();
    let r2 = store.create_rubric(&owner, rubric_input("B")).unwrap();

    store.create_nota(&owner, &group.id, &nota(1, &r1, 70.0)).unwrap();
    let err = store.create_nota(&owner, &group.id, &nota(2, &r2, 40.0)).unwrap_err();
    assert_eq!(err.status(), 400);
    store.create_nota(&owner, &group.id, &nota(2, &r2, 30.0)).unwrap();

    let err = store
        .update_nota_percentage(&owner, &group.id, 1, 80.0)
        .unwrap_err();
    assert_eq!(err.status(), 400);
    store.update_nota_percentage(&owner, &group.id, 1, 70.0).unwrap();
}

#[test]
fn test_grading_requires_owner_or_moderator() {
    let f = fixture();
    let stranger = f.store.register_teacher("stranger@x.edu", PASSWORD).unwrap();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();

    let err = f
        .store
        .create_nota(&stranger, &f.group.id, &nota(1, &r1, 10.0))
        .unwrap_err();
    assert_eq!(err.status(), 403);

    // a plain course member can read but not grade
    f.store
        .add_course_teachers(
            &f.owner,
            &f.course.id,
            &[MemberRequest {
                email: "stranger@x.edu".into(),
                moderator: false,
            }],
        )
        .unwrap();
    assert!(f.store.get_group(&stranger, &f.group.id).is_ok());
    let err = f
        .store
        .create_nota(&stranger, &f.group.id, &nota(1, &r1, 10.0))
        .unwrap_err();
    assert_eq!(err.status(), 403);

    f.store
        .set_course_moderator(&f.owner, &f.course.id, "stranger@x.edu", true)
        .unwrap();
    let err = f
        .store
        .create_nota(&stranger, &f.group.id, &nota(1, &r1, 10.0))
        .unwrap_err();
    assert_eq!(err.status(), 403);

    let own = f.store.create_rubric(&stranger, rubric_input("B")).unwrap();
    f.store
        .create_nota(&stranger, &f.group.id, &nota(1, &own, 10.0))
        .unwrap();
}

#[test]
fn test_assign_guide_replaces_active() {
    let f = fixture();
    let a = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    let b = f.store.create_rubric(&f.owner, rubric_input("B")).unwrap();
    let scope = Scope::Course(f.course.id.clone());

    let first = f.store.assign_guide(&f.owner, &a.id, &scope).unwrap();
    assert!(first.registered);
    assert!(first.deactivated.is_empty());

    let second = f.store.assign_guide(&f.owner, &b.id, &scope).unwrap();
    assert_eq!(second.deactivated, vec![a.id.clone()]);

    assert_eq!(f.store.get_rubric(&f.owner, &a.id).unwrap().state, RubricState::Inactive);
    assert_eq!(f.store.get_rubric(&f.owner, &b.id).unwrap().state, RubricState::Active);

    let again = f.store.assign_guide(&f.owner, &b.id, &scope).unwrap();
    assert!(!again.changed());

    let course = f.store.get_course(&f.owner, &f.course.id).unwrap();
    assert_eq!(course.guide_rubric_ids, vec![a.id.clone(), b.id.clone()]);

    // explicit reassignment brings an inactive guide back
    f.store.assign_guide(&f.owner, &a.id, &scope).unwrap();
    assert_eq!(f.store.get_rubric(&f.owner, &a.id).unwrap().state, RubricState::Active);
    assert_eq!(f.store.get_rubric(&f.owner, &b.id).unwrap().state, RubricState::Inactive);
}

#[test]
fn test_assign_guide_to_group_scope() {
    let f = fixture();
    let a = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    let b = f.store.create_rubric(&f.owner, rubric_input("B")).unwrap();
    let scope = Scope::Group(f.group.id.clone());

    f.store.assign_guide(&f.owner, &a.id, &scope).unwrap();
    f.store.assign_guide(&f.owner, &b.id, &scope).unwrap();

    let rubrics = f.store.group_rubrics(&f.owner, &f.group.id).unwrap();
    let active: Vec<_> = rubrics
        .iter()
        .filter(|r| r.state == RubricState::Active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
}

#[test]
fn test_concurrent_guide_assignment_keeps_one_active() {
    let f = fixture();
    let scope = Scope::Course(f.course.id.clone());
    let candidates: Vec<Rubric> = (0..6)
        .map(|i| {
            f.store
                .create_rubric(&f.owner, rubric_input(&format!("R{}", i)))
                .unwrap()
        })
        .collect();

    let stores: Vec<Store> = candidates
        .iter()
        .map(|_| Store::open(f.store.root()).unwrap())
        .collect();
    let barrier = Barrier::new(stores.len());

    std::thread::scope(|s| {
        for (store, rubric) in stores.into_iter().zip(&candidates) {
            let barrier = &barrier;
            let owner = f.owner.clone();
            let scope = scope.clone();
            s.spawn(move || {
                barrier.wait();
                store.assign_guide(&owner, &rubric.id, &scope).unwrap();
            });
        }
    });

    let guides = crate::db::rubrics::scope_guides(f.store.db().conn(), &scope).unwrap();
    assert_eq!(guides.len(), candidates.len());
    let active = guides
        .iter()
        .filter(|(_, state)| *state == RubricState::Active)
        .count();
    assert_eq!(active, 1);
    assert!(guides
        .iter()
        .all(|(_, state)| *state != RubricState::Draft));
}

#[test]
fn test_visible_rubrics_union() {
    let f = fixture();
    let other = f.store.register_teacher("other@x.edu", PASSWORD).unwrap();

    let draft = f.store.create_rubric(&f.owner, rubric_input("Mine")).unwrap();
    let guide = f.store.create_rubric(&f.owner, rubric_input("Guide")).unwrap();
    let for_group = f.store.create_rubric(&f.owner, rubric_input("Group")).unwrap();
    let foreign = f.store.create_rubric(&other, rubric_input("Foreign")).unwrap();

    f.store
        .assign_guide(&f.owner, &guide.id, &Scope::Course(f.course.id.clone()))
        .unwrap();
    // the group guide is also a course guide later, and must appear once
    f.store
        .assign_guide(&f.owner, &for_group.id, &Scope::Group(f.group.id.clone()))
        .unwrap();
    f.store
        .assign_guide(&f.owner, &for_group.id, &Scope::Course(f.course.id.clone()))
        .unwrap();

    let visible: Vec<String> = f
        .store
        .visible_rubrics(&f.owner)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(visible.len(), 3);
    assert!(visible.contains(&draft.id));
    assert!(visible.contains(&guide.id));
    assert!(visible.contains(&for_group.id));
    assert!(!visible.contains(&foreign.id));

    let err = f.store.get_rubric(&f.owner, &foreign.id).unwrap_err();
    assert_eq!(err.status(), 403);
}

#[test]
fn test_foreign_draft_cannot_back_a_nota() {
    let f = fixture();
    let other = f.store.register_teacher("other@x.edu", PASSWORD).unwrap();
    let private = f.store.create_rubric(&other, rubric_input("Privada")).unwrap();

    let err = f.store.get_rubric(&f.owner, &private.id).unwrap_err();
    assert_eq!(err.status(), 403);

    let err = f
        .store
        .create_nota(&f.owner, &f.group.id, &nota(1, &private, 50.0))
        .unwrap_err();
    assert_eq!(err.status(), 403);

    assert!(f.store.list_notas(&f.owner, &f.group.id).unwrap().is_empty());
    assert!(f.store.load_group(&f.group.id).unwrap().rubric_ids.is_empty());
    assert!(f.store.visible_rubrics(&f.owner).unwrap().is_empty());

    let err = f
        .store
        .update_rubric(&f.owner, &private.id, rubric_input("Hijacked"))
        .unwrap_err();
    assert_eq!(err.status(), 403);
    assert_eq!(f.store.get_rubric(&other, &private.id).unwrap().name, "Privada");
}

#[test]
fn test_clone_rubric_is_detached_draft() {
    let f = fixture();
    let source = f
        .store
        .create_rubric(
            &f.owner,
            NewRubric {
                name: "Exposición".into(),
                topics: vec![Topic::new("T1", vec![Criterion::new("C1", 50.0)])],
            },
        )
        .unwrap();
    f.store
        .assign_guide(&f.owner, &source.id, &Scope::Course(f.course.id.clone()))
        .unwrap();

    let stored_rubrics = |store: &Store| -> i64 {
        store
            .db()
            .conn()
            .query_row("SELECT COUNT(*) FROM rubrics", [], |r| r.get(0))
            .unwrap()
    };
    let before = stored_rubrics(&f.store);
    let copy = f.store.clone_rubric(&f.owner, &source.id).unwrap();
    assert_eq!(copy.name, "Exposición (Copy)");
    assert_eq!(copy.state, RubricState::Draft);
    assert_eq!(copy.topics, source.topics);
    assert_eq!(stored_rubrics(&f.store), before);

    let stored = f.store.duplicate_rubric(&f.owner, &source.id).unwrap();
    assert_ne!(stored.id, source.id);
    assert_eq!(stored.state, RubricState::Draft);
    assert_eq!(stored.owner_id.as_deref(), Some(f.owner.id.as_str()));
}

#[test]
fn test_grade_report_goes_to_outbox() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 50.0)).unwrap();
    f.store
        .submit_grade(&f.owner, &f.group.id, 1, submission("ana@x.edu", filled(40.0, 2.0)))
        .unwrap();

    let delivery = f
        .store
        .send_grade_report(
            &f.owner,
            &f.group.id,
            "ana@x.edu",
            Some(Attachment::from_bytes("notas.pdf", b"%PDF-1.4".to_vec())),
        )
        .unwrap();
    assert_eq!(delivery.to, "ana@x.edu");
    assert_eq!(delivery.average, 40.0);

    let messages = OutboxMailer::new(f.store.outbox_dir()).messages().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["attachments"][0]["content_type"], "application/pdf");
    assert!(messages[0]["text"].as_str().unwrap().contains("Promedio: 40.00"));
}

#[test]
fn test_summary_and_group_cascade() {
    let f = fixture();
    let r1 = f.store.create_rubric(&f.owner, rubric_input("A")).unwrap();
    f.store.create_nota(&f.owner, &f.group.id, &nota(1, &r1, 60.0)).unwrap();
    f.store
        .submit_grade(&f.owner, &f.group.id, 1, submission("leo@x.edu", filled(50.0, 2.0)))
        .unwrap();

    let summary = f.store.grade_summary(&f.owner, &f.group.id).unwrap();
    assert_eq!(summary.total_percentage, 60.0);
    let leo = summary.students.iter().find(|s| s.email == "leo@x.edu").unwrap();
    assert_eq!(leo.finals, vec![(1, 60.0)]);

    f.store.delete_group(&f.owner, &f.group.id).unwrap();
    let err = f.store.get_group(&f.owner, &f.group.id).unwrap_err();
    assert_eq!(err.status(), 404);

    let count: i64 = f
        .store
        .db()
        .conn()
        .query_row("SELECT COUNT(*) FROM calificaciones", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);

    f.store.delete_course(&f.owner, &f.course.id).unwrap();
    assert!(f.store.list_courses(&f.owner).unwrap().is_empty());
}
