//! `rubrica group` commands - groups and their students

use crate::cli::output::{print_json, score};
use crate::cli::GroupCommands;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::roster::Group;
use rubrica_core::store::{NewGroup, StudentUpdate};

pub fn execute(ctx: &CommandContext, command: &GroupCommands) -> Result<()> {
    let (store, actor) = ctx.store_and_actor()?;

    match command {
        GroupCommands::Create {
            course_id,
            name,
            students,
        } => {
            let group = store.create_group(
                &actor,
                NewGroup {
                    course_id: course_id.clone(),
                    name: name.clone(),
                    students: students.clone(),
                },
            )?;
            print_group(ctx, &group)
        }
        GroupCommands::List { course_id, mine } => {
            let groups = store.list_groups(&actor, course_id, *mine)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&groups),
                human => {
                    for group in &groups {
                        println!("{} {} ({} students)", group.id, group.name, group.students.len());
                    }
                }
            )
        }
        GroupCommands::Show { id } => print_group(ctx, &store.get_group(&actor, id)?),
        GroupCommands::AddStudent { id, students } => {
            let change = store.add_students(&actor, id, students)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&change),
                human => {
                    for email in &change.added {
                        println!("Enrolled {}", email);
                    }
                    for email in &change.already_present {
                        println!("Already enrolled: {}", email);
                    }
                }
            )
        }
        GroupCommands::UpdateStudent {
            id,
            email,
            name,
            new_email,
        } => {
            let student = store.update_student(
                &actor,
                id,
                email,
                StudentUpdate {
                    name: name.clone(),
                    email: new_email.clone(),
                },
            )?;
            output_by_format!(ctx.cli.format,
                json => print_json(&student),
                human => {
                    println!("{} <{}>", student.name, student.email);
                }
            )
        }
        GroupCommands::RemoveStudent { id, email } => {
            print_group(ctx, &store.remove_student(&actor, id, email)?)
        }
        GroupCommands::Rename { id, name } => print_group(ctx, &store.rename_group(&actor, id, name)?),
        GroupCommands::Delete { id } => {
            store.delete_group(&actor, id)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&serde_json::json!({ "status": "deleted", "id": id })),
                human => {
                    println!("Deleted group {}", id);
                }
            )
        }
    }
}

fn print_group(ctx: &CommandContext, group: &Group) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(group),
        human => {
            println!("{} {} (course {})", group.id, group.name, group.course_id);
            println!("Students:");
            for student in &group.students {
                println!("  {:<32} {:>8}  {}", student.email, score(student.average), student.name);
            }
            if !group.notas.is_empty() {
                println!("Notas:");
                for nota in &group.notas {
                    println!(
                        "  {:>2}. {} {}% rubric {}",
                        nota.number, nota.date, nota.percentage, nota.rubric_id
                    );
                }
            }
        }
    )
}
