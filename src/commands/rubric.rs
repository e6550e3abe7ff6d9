//! `rubrica rubric` commands - templates, copies and guide assignment

use crate::cli::args::AssignArgs;
use crate::cli::output::print_json;
use crate::cli::RubricCommands;
use crate::commands::dispatch::CommandContext;
use crate::commands::input::read_json;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::rubric::{NewRubric, Rubric, Scope};
use rubrica_core::store::Store;
use rubrica_core::roster::Teacher;

pub fn execute(ctx: &CommandContext, command: &RubricCommands) -> Result<()> {
    let (store, actor) = ctx.store_and_actor()?;

    match command {
        RubricCommands::Create { input } => {
            let rubric = store.create_rubric(&actor, read_json::<NewRubric>(input)?)?;
            print_rubric(ctx, &rubric)
        }
        RubricCommands::Show { id } => print_rubric(ctx, &store.get_rubric(&actor, id)?),
        RubricCommands::Update { id, input } => {
            let rubric = store.update_rubric(&actor, id, read_json::<NewRubric>(input)?)?;
            print_rubric(ctx, &rubric)
        }
        RubricCommands::Clone { id, save: true } => {
            print_rubric(ctx, &store.duplicate_rubric(&actor, id)?)
        }
        RubricCommands::Clone { id, save: false } => {
            // A detached copy is only ever printed as a document
            print_json(&store.clone_rubric(&actor, id)?)
        }
        RubricCommands::Assign(args) => assign(ctx, &store, &actor, args),
        RubricCommands::List { group } => {
            let rubrics = match group {
                Some(group_id) => store.group_rubrics(&actor, group_id)?,
                None => store.visible_rubrics(&actor)?,
            };
            output_by_format!(ctx.cli.format,
                json => print_json(&rubrics),
                human => {
                    for rubric in &rubrics {
                        println!("{} [{}] {}", rubric.id, rubric.state, rubric.name);
                    }
                }
            )
        }
    }
}

fn assign(ctx: &CommandContext, store: &Store, actor: &Teacher, args: &AssignArgs) -> Result<()> {
    let scope = match (&args.scope.course, &args.scope.group) {
        (Some(course), None) => Scope::Course(course.clone()),
        (None, Some(group)) => Scope::Group(group.clone()),
        _ => rubrica_core::bail_usage!("pass exactly one of --course or --group"),
    };

    let assignment = store.assign_guide(actor, &args.id, &scope)?;
    output_by_format!(ctx.cli.format,
        json => print_json(&assignment),
        human => {
            if assignment.changed() {
                println!("{} is now the active guide of {}", assignment.rubric_id, scope);
                for id in &assignment.deactivated {
                    println!("  deactivated {}", id);
                }
            } else {
                println!("{} is already the active guide of {}", assignment.rubric_id, scope);
            }
        }
    )
}

fn print_rubric(ctx: &CommandContext, rubric: &Rubric) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(rubric),
        human => {
            println!("{} {} [{}]", rubric.id, rubric.name, rubric.state);
            for topic in &rubric.topics {
                println!("  {}", topic.name);
                for criterion in &topic.criteria {
                    println!(
                        "    {:<40} weight {}",
                        criterion.label,
                        criterion.weight.unwrap_or(0.0)
                    );
                }
            }
        }
    )
}
