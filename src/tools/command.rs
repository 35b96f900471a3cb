//! Running external toolchain commands.

use std::process::Command;

use crate::context::Context;
use crate::error::{RecipeError, Result};
use crate::output;

/// Shell-quote a value for display.
pub fn shell_quote(s: impl std::fmt::Display) -> String {
    let s = s.to_string();
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ':' | '+')
        })
    {
        s
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

/// Printable form of a command line.
pub fn display(cmd: &Command) -> String {
    let mut parts = vec![shell_quote(cmd.get_program().to_string_lossy())];
    parts.extend(cmd.get_args().map(|a| shell_quote(a.to_string_lossy())));
    parts.join(" ")
}

/// Run a command, failing on non-zero exit.
///
/// In dry-run mode the command is only recorded and echoed.
pub fn run(ctx: &Context, cmd: &mut Command) -> Result<()> {
    let line = display(cmd);
    ctx.record(line.clone());

    if ctx.verbose || ctx.dry_run {
        output::command(ctx.dry_run, &line);
    }
    if ctx.dry_run {
        return Ok(());
    }

    let status = cmd.status()?;
    if !status.success() {
        return Err(RecipeError::CommandFailed {
            cmd: line,
            code: status.code(),
        });
    }
    Ok(())
}
