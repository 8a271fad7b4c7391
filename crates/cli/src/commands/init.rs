//! Init command implementation

use crate::error::{CliError, CliResult};
use std::fs;
use std::path::Path;

pub struct Options {
    pub force: bool,
    pub example_flags: bool,
    pub no_examples: bool,
}

fn check_existing_project() -> bool {
    Path::new("flags.definitions.yaml").exists() || Path::new(".flagc").exists()
}

fn ensure_flagc_directory() -> CliResult<()> {
    fs::create_dir_all(".flagc").map_err(CliError::from)
}

fn create_definitions_file() -> CliResult<()> {
    let definitions_content = r"flags:
  - name: example_flag
    type: boolean
    defaultValue: false
    description: An example feature flag
";
    fs::write("flags.definitions.yaml", definitions_content).map_err(CliError::from)
}

fn create_deployment_file() -> CliResult<()> {
    let deployment_content = r"environment: production
rules:
  example_flag:
    rules:
      - serve: false
";
    fs::write(".flagc/production.deployment.yaml", deployment_content).map_err(CliError::from)
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(created_definitions) => {
            println!("✓ Project initialized");
            if created_definitions {
                println!("  Created flags.definitions.yaml");
            }
            println!("  Created .flagc/production.deployment.yaml");
            println!();
            println!("Next steps:");
            println!("  1. Validate your files: flagc validate --definitions flags.definitions.yaml --deployment .flagc/production.deployment.yaml");
            println!("  2. Compile AST: flagc compile --deployment .flagc/production.deployment.yaml");
            println!("  3. Add more flags: Edit flags.definitions.yaml");
            0
        }
        Err(e) => {
            eprintln!("✗ Initialization failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<bool> {
    let has_existing_files = check_existing_project();

    if has_existing_files && !options.force {
        return Err(CliError::Message(
            "Project already initialized. Use --force to overwrite existing files".to_string(),
        ));
    }

    ensure_flagc_directory()?;

    // Create definitions file if:
    // - example_flags is explicitly set to true, OR
    // - no_examples is false (default behavior is to create examples)
    let create_definitions = options.example_flags || !options.no_examples;
    if create_definitions {
        create_definitions_file()?;
    }

    create_deployment_file()?;

    Ok(create_definitions)
}
