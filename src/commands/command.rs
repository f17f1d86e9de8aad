//! The [`Command`] trait implemented by every subcommand.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// A runnable subcommand. `command_line` is the full invocation, recorded in `@PG` headers.
#[enum_dispatch]
pub trait Command {
    fn execute(&self, command_line: &str) -> Result<()>;
}
