use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use binding_builder::{BuildError, build_from_path};
use clap::Parser;
use config_validator::format_issue;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile footswitch profiles into binding tables", long_about = None)]
struct Cli {
    /// Path to YAML profile
    profile: PathBuf,
    /// Output table path (defaults to the profile path with .bindings)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let out_path = cli
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.profile));

    match build_from_path(&cli.profile) {
        Ok((output, bytes)) => {
            print_diagnostics(&output.diagnostics);
            fs::write(&out_path, bytes)
                .with_context(|| format!("writing binding table to {}", out_path.display()))?;
            println!(
                "Binding table generated at {} ({} actions, {} switches)",
                out_path.display(),
                output.table.actions.len(),
                output.table.switches.len()
            );
            Ok(())
        }
        Err(BuildError::Validation(diags)) => {
            print_diagnostics(&diags);
            eprintln!("Binding table build failed due to validation errors.");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

fn default_output_path(profile_path: &Path) -> PathBuf {
    let mut out = profile_path.to_path_buf();
    out.set_extension("bindings");
    out
}

fn print_diagnostics(diags: &[config_validator::ValidationIssue]) {
    if diags.is_empty() {
        return;
    }
    eprintln!("Diagnostics:");
    for diag in diags {
        eprintln!("{}", format_issue(diag));
    }
}
