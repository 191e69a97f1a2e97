// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and hands every command to the PrepareUseCase.
//
// Four commands are supported:
//   1. `check`   — validate all configured splits
//   2. `build`   — build mini-batches for one split or all
//   3. `inspect` — load stored mini-batches and show shapes
//   4. `delete`  — remove stored mini-batches
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildArgs, Commands, ConfigArgs, SplitArgs};

use crate::application::prepare_use_case::{BuildTarget, PrepareUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "seq-minibatch",
    version,
    about = "Validate sequence data sets and build padded, masked mini-batches for RNN training."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the use case.
    /// This layer only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Check(args)   => run_check(args),
            Commands::Build(args)   => run_build(args),
            Commands::Inspect(args) => run_inspect(args),
            Commands::Delete(args)  => run_delete(args),
        }
    }
}

fn run_check(args: ConfigArgs) -> Result<()> {
    let mut use_case = PrepareUseCase::new(args.resolve()?)?;

    for (split, m) in use_case.check()? {
        println!(
            "{split:<5}  samples={:<7} x_size={:<4} y_size={:<4} batches={}",
            m.set_len, m.x_size, m.y_size, m.batch_quantity
        );
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
    let target = match args.split {
        Some(name) if !args.all => BuildTarget::One(name),
        _                       => BuildTarget::All,
    };

    let mut use_case = PrepareUseCase::new(args.config.resolve()?)?;
    for (split, batches) in use_case.build(target)? {
        println!("{split}: {batches} mini-batches stored");
    }
    Ok(())
}

fn run_inspect(args: SplitArgs) -> Result<()> {
    let use_case = PrepareUseCase::new(args.config.resolve()?)?;

    for s in use_case.inspect(&args.split)? {
        println!(
            "batch {:<4} input={:?} target={:?} mask={:?} active={}",
            s.index, s.input_dims, s.target_dims, s.mask_dims, s.active_steps
        );
    }
    Ok(())
}

fn run_delete(args: SplitArgs) -> Result<()> {
    let use_case = PrepareUseCase::new(args.config.resolve()?)?;
    use_case.delete(&args.split)?;
    println!("Deleted {} mini-batches.", args.split);
    Ok(())
}
