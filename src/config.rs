//! CLI-facing configuration for the frontend binary.
//!
//! Nothing here is consulted by [`crate::interpreter::interpret`] itself —
//! these toggles only raise the logging level before the pipeline runs, so
//! the core evaluator's behavior never depends on them.

use clap::Parser as ClapParser;
use std::path::PathBuf;

#[derive(Debug, ClapParser)]
#[command(name = "bsl-interpreter", version, about = "A beginning-student-language Lisp interpreter")]
pub struct Cli {
    /// Source file to interpret. Reads from stdin if omitted.
    pub path: Option<PathBuf>,

    /// Log scope-table pushes, pops, and name resolutions at debug level.
    #[arg(long)]
    pub verbose_scope: bool,

    /// Log activation-record frame pushes and rebinds at debug level.
    #[arg(long)]
    pub verbose_stack: bool,
}

impl Cli {
    /// Highest `log` level this invocation should emit at.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose_scope || self.verbose_stack {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_level_is_info() {
        let cli = Cli { path: None, verbose_scope: false, verbose_stack: false };
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn either_verbose_flag_raises_to_debug() {
        let cli = Cli { path: None, verbose_scope: true, verbose_stack: false };
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }
}
