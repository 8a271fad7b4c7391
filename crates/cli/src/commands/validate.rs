//! Validate command implementation

use crate::error::{CliError, CliResult};
use flagc_compiler::{
    parse_definitions, parse_deployment, validate_definitions, validate_deployment,
};
use std::fs;
use std::path::PathBuf;

pub struct Options {
    pub definitions: Option<String>,
    pub deployment: Option<String>,
}

#[derive(Debug, Clone)]
enum FileToValidate {
    Definitions(PathBuf),
    Deployment(PathBuf),
}

fn collect_files_from_options(options: &Options) -> Vec<FileToValidate> {
    let mut files = Vec::new();

    if let Some(ref definitions) = options.definitions {
        files.push(FileToValidate::Definitions(PathBuf::from(definitions)));
    }

    if let Some(ref deployment) = options.deployment {
        files.push(FileToValidate::Deployment(PathBuf::from(deployment)));
    }

    files
}

fn validate_file(file: &FileToValidate) -> CliResult<()> {
    match file {
        FileToValidate::Definitions(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::Message(format!("Failed to read {}: {e}", path.display()))
            })?;
            let definitions = parse_definitions(&content)?;
            validate_definitions(&definitions)?;
            Ok(())
        }
        FileToValidate::Deployment(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::Message(format!("Failed to read {}: {e}", path.display()))
            })?;
            let deployment = parse_deployment(&content)?;
            validate_deployment(&deployment)?;
            Ok(())
        }
    }
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(valid_count) => {
            println!(
                "✓ Validation passed ({} file{})",
                valid_count,
                if valid_count > 1 { "s" } else { "" }
            );
            0
        }
        Err(e) => {
            eprintln!("✗ Validation failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<usize> {
    let files_to_validate = collect_files_from_options(options);

    if files_to_validate.is_empty() {
        return Err(CliError::Message(
            "No files to validate. Use --definitions <file> and/or --deployment <file>"
                .to_string(),
        ));
    }

    let mut valid_count = 0;
    let mut has_errors = false;

    for file in &files_to_validate {
        match validate_file(file) {
            Ok(()) => {
                valid_count += 1;
            }
            Err(e) => {
                eprintln!("✗ Failed to validate {file:?}");
                eprintln!("  Error: {e}");
                has_errors = true;
            }
        }
    }

    if has_errors {
        return Err(CliError::Message(
            "One or more files failed validation".to_string(),
        ));
    }

    Ok(valid_count)
}
