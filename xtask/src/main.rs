use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for lumen")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, test and doc, stopping at the first failure
    Check,
    Fmt,
    Clippy,
    Test,
    Doc,
    Build,
    /// Print the default frame plan through the CLI
    Plan,
    /// Headless IBL bake through the CLI; needs a GPU adapter
    Bake,
}

/// A cargo invocation and the message shown when it fails.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "fmt",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    name: "doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BUILD: Step = Step {
    name: "build",
    args: &["build", "--workspace"],
};
const PLAN: Step = Step {
    name: "plan",
    args: &["run", "-q", "-p", "lumen-cli", "--", "plan", "--gizmos"],
};
const BAKE: Step = Step {
    name: "bake",
    args: &["run", "--release", "-q", "-p", "lumen-cli", "--", "bake"],
};

fn run(step: &Step) -> Result<()> {
    println!("==> cargo {}", step.args.join(" "));
    let status = Command::new("cargo")
        .args(step.args)
        .status()
        .with_context(|| format!("spawn cargo for {}", step.name))?;
    if !status.success() {
        bail!("{} failed ({status})", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps: &[&Step] = match cli.command {
        Commands::Check => &[&FMT, &CLIPPY, &TEST, &DOC],
        Commands::Fmt => &[&FMT],
        Commands::Clippy => &[&CLIPPY],
        Commands::Test => &[&TEST],
        Commands::Doc => &[&DOC],
        Commands::Build => &[&BUILD],
        Commands::Plan => &[&PLAN],
        Commands::Bake => &[&BAKE],
    };
    for step in steps {
        run(step)?;
    }
    Ok(())
}
