use std::fs;
use std::path::PathBuf;

use clap::Parser;
use config_validator::{Severity, format_issue};

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate footswitch binding profiles", long_about = None)]
struct Cli {
    /// Path to YAML profile
    path: PathBuf,
    /// Also print info-level diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let content = match fs::read_to_string(&cli.path) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", cli.path.display());
            std::process::exit(1);
        }
    };

    match config_validator::parse_config_str(&content) {
        Ok(config) => {
            let issues: Vec<_> = config_validator::validate_config(&config, &content)
                .into_iter()
                .filter(|issue| cli.verbose || issue.severity != Severity::Info)
                .collect();
            if issues.is_empty() {
                println!("Validation OK: {}", cli.path.display());
            } else {
                let has_errors = issues.iter().any(|i| i.severity == Severity::Error);
                eprintln!("Validation diagnostics:");
                for issue in &issues {
                    eprintln!("{}", format_issue(issue));
                }
                if has_errors {
                    std::process::exit(2);
                }
            }
        }
        Err(err) => {
            eprintln!("Validation failed: {err}");
            std::process::exit(1);
        }
    }
}
