//! `rubrica nota` commands - notas, grades and summaries

use crate::cli::args::NotaCreateArgs;
use crate::cli::output::{print_json, score};
use crate::cli::NotaCommands;
use crate::commands::dispatch::CommandContext;
use crate::commands::input::read_json;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::roster::{NewNota, Nota};
use rubrica_core::store::{GradeSubmission, NotaChange, StudentGrade};

pub fn execute(ctx: &CommandContext, command: &NotaCommands) -> Result<()> {
    let (store, actor) = ctx.store_and_actor()?;

    match command {
        NotaCommands::Create(args) => {
            let nota = store.create_nota(&actor, &args.group_id, &new_nota(args))?;
            print_nota(ctx, &nota)
        }
        NotaCommands::List { group_id } => {
            let notas = store.list_notas(&actor, group_id)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&notas),
                human => {
                    for nota in &notas {
                        println!("{:>2}. {} {}% rubric {}", nota.number, nota.date, nota.percentage, nota.rubric_id);
                    }
                }
            )
        }
        NotaCommands::Show { group_id, number } => {
            print_nota(ctx, &store.get_nota(&actor, group_id, *number)?)
        }
        NotaCommands::Grade {
            group_id,
            number,
            input,
            student,
        } => {
            let mut submission: GradeSubmission = read_json(input)?;
            if let Some(email) = student {
                submission.student_email = email.clone();
            }
            let grade = store.submit_grade(&actor, group_id, *number, submission)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&grade),
                human => {
                    println!(
                        "{}: raw {} final {} average {}",
                        grade.student_email,
                        score(grade.calificacion.raw_score),
                        score(grade.calificacion.final_score),
                        score(grade.average)
                    );
                }
            )
        }
        NotaCommands::Reweight {
            group_id,
            number,
            percentage,
        } => {
            let change = store.update_nota_percentage(&actor, group_id, *number, *percentage)?;
            print_change(ctx, &change, "Reweighted")
        }
        NotaCommands::Delete { group_id, number } => {
            let change = store.delete_nota(&actor, group_id, *number)?;
            print_change(ctx, &change, "Deleted")
        }
        NotaCommands::Revert {
            group_id,
            number,
            email,
        } => {
            let average = store.revert_grade(&actor, group_id, *number, email)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&serde_json::json!({ "student_email": email, "average": average })),
                human => {
                    println!("{}: average {}", email, score(average));
                }
            )
        }
        NotaCommands::StudentGrade {
            group_id,
            number,
            email,
        } => {
            let grade = store.get_student_grade(&actor, group_id, *number, email)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&grade),
                human => {
                    match &grade {
                        StudentGrade::Recorded(c) => {
                            println!("raw {} final {}", score(c.raw_score), score(c.final_score));
                            for topic in &c.topics {
                                println!("  {}", topic.name);
                                for criterion in &topic.criteria {
                                    println!(
                                        "    {:<40} {} x {}",
                                        criterion.label,
                                        criterion.weight.unwrap_or(0.0),
                                        criterion.score.unwrap_or(0.0)
                                    );
                                }
                            }
                        }
                        StudentGrade::Empty { .. } => println!("No grade recorded"),
                    }
                }
            )
        }
        NotaCommands::Summary { group_id } => {
            let summary = store.grade_summary(&actor, group_id)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&summary),
                human => {
                    println!("Total percentage: {}%", summary.total_percentage);
                    for student in &summary.students {
                        let finals: Vec<String> = student
                            .finals
                            .iter()
                            .map(|(number, value)| format!("{}={}", number, score(*value)))
                            .collect();
                        println!("{:<32} {:>8}  {}", student.email, score(student.average), finals.join(" "));
                    }
                }
            )
        }
    }
}

fn new_nota(args: &NotaCreateArgs) -> NewNota {
    NewNota {
        number: args.number,
        rubric_id: args.rubric.clone(),
        date: args.date.clone(),
        percentage: args.percentage,
    }
}

fn print_nota(ctx: &CommandContext, nota: &Nota) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(nota),
        human => {
            println!("Nota {} on {}: {}% with rubric {}", nota.number, nota.date, nota.percentage, nota.rubric_id);
        }
    )
}

fn print_change(ctx: &CommandContext, change: &NotaChange, verb: &str) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(change),
        human => {
            println!(
                "{} nota {} ({} grades affected)",
                verb,
                change.nota.number,
                change.affected_students.len()
            );
        }
    )
}
