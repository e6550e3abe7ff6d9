//! `rubrica course` commands

use crate::cli::output::print_json;
use crate::cli::CourseCommands;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::roster::Course;
use rubrica_core::store::{MembershipChange, NewCourse};

pub fn execute(ctx: &CommandContext, command: &CourseCommands) -> Result<()> {
    let (store, actor) = ctx.store_and_actor()?;

    match command {
        CourseCommands::Create {
            name,
            icon,
            teachers,
        } => {
            let course = store.create_course(
                &actor,
                NewCourse {
                    name: name.clone(),
                    icon: icon.clone(),
                    teachers: teachers.clone(),
                },
            )?;
            print_course(ctx, &course)
        }
        CourseCommands::List => {
            let courses = store.list_courses(&actor)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&courses),
                human => {
                    if courses.is_empty() && !ctx.cli.quiet {
                        eprintln!("No courses");
                    }
                    for course in &courses {
                        let role = if course.is_moderator(&actor.id) { " [moderator]" } else { "" };
                        println!("{} {}{}", course.id, course.name, role);
                    }
                }
            )
        }
        CourseCommands::Show { id } => print_course(ctx, &store.get_course(&actor, id)?),
        CourseCommands::AddTeacher { id, teachers } => {
            let change = store.add_course_teachers(&actor, id, teachers)?;
            print_membership(ctx, &change)
        }
        CourseCommands::SetModerator { id, email, revoke } => {
            let course = store.set_course_moderator(&actor, id, email, !revoke)?;
            print_course(ctx, &course)
        }
        CourseCommands::RemoveTeacher { id, email } => {
            let course = store.remove_course_teacher(&actor, id, email)?;
            print_course(ctx, &course)
        }
        CourseCommands::Update { id, name, icon } => {
            let course = store.update_course(&actor, id, name.as_deref(), icon.as_deref())?;
            print_course(ctx, &course)
        }
        CourseCommands::Delete { id } => {
            store.delete_course(&actor, id)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&serde_json::json!({ "status": "deleted", "id": id })),
                human => {
                    println!("Deleted course {}", id);
                }
            )
        }
    }
}

fn print_course(ctx: &CommandContext, course: &Course) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(course),
        human => {
            println!("{} {}", course.id, course.name);
            if !course.icon.is_empty() {
                println!("Icon: {}", course.icon);
            }
            println!("Teachers:");
            for member in &course.teachers {
                let role = if member.moderator { " (moderator)" } else { "" };
                println!("  {}{}", member.email, role);
            }
            if !course.group_ids.is_empty() {
                println!("Groups: {}", course.group_ids.join(", "));
            }
            if !course.guide_rubric_ids.is_empty() {
                println!("Guides: {}", course.guide_rubric_ids.join(", "));
            }
        }
    )
}

fn print_membership(ctx: &CommandContext, change: &MembershipChange) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(change),
        human => {
            for email in &change.added {
                println!("Added {}", email);
            }
            for email in &change.already_present {
                println!("Already a member: {}", email);
            }
            for email in &change.unknown {
                println!("No such teacher: {}", email);
            }
        }
    )
}
