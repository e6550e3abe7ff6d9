//! `rubrica teacher` commands - accounts and recovery codes

use crate::cli::output::print_json;
use crate::cli::TeacherCommands;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::roster::Teacher;

pub fn execute(ctx: &CommandContext, command: &TeacherCommands) -> Result<()> {
    let store = ctx.discover_or_open_store()?;

    match command {
        TeacherCommands::Register { email, password } => {
            let teacher = store.register_teacher(email, password)?;
            print_teacher(ctx, &teacher, "Registered")
        }
        TeacherCommands::Login { email, password } => {
            let teacher = store.login(email, password)?;
            print_teacher(ctx, &teacher, "Logged in as")
        }
        TeacherCommands::Recover { email } => {
            let request = store.request_recovery_code(email)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&request),
                human => {
                    println!("Recovery code sent to {}", request.email);
                }
            )
        }
        TeacherCommands::ResetPassword {
            email,
            code,
            password,
        } => {
            store.reset_password(email, code, password)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&serde_json::json!({ "status": "ok", "email": email })),
                human => {
                    println!("Password updated");
                }
            )
        }
        TeacherCommands::ChangeEmail {
            email,
            code,
            new_email,
        } => {
            let teacher = store.change_email(email, code, new_email)?;
            print_teacher(ctx, &teacher, "Email changed to")
        }
    }
}

fn print_teacher(ctx: &CommandContext, teacher: &Teacher, verb: &str) -> Result<()> {
    output_by_format!(ctx.cli.format,
        json => print_json(teacher),
        human => {
            println!("{} {} ({})", verb, teacher.email, teacher.id);
        }
    )
}
