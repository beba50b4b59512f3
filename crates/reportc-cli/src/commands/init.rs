//! Project initialization command (reportc init)

use anyhow::{bail, Context, Result};
use reportc_config::project::{DEFAULT_SOURCE_DIR, PROJECT_CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    pub name: Option<String>,
    /// Path to create the project in
    pub path: PathBuf,
    /// Verbose output
    pub verbose: bool,
}

impl Default for InitArgs {
    fn default() -> Self {
        Self {
            name: None,
            path: PathBuf::from("."),
            verbose: false,
        }
    }
}

/// Run the init command
pub fn run(args: InitArgs) -> Result<()> {
    let path = args
        .path
        .canonicalize()
        .unwrap_or_else(|_| args.path.clone());

    let name = match args.name {
        Some(n) => {
            validate_project_name(&n)?;
            n
        }
        None => {
            let dir_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "my-reports".to_string());
            validate_project_name(&dir_name)?;
            dir_name
        }
    };

    let manifest_path = path.join(PROJECT_CONFIG_FILE);
    if manifest_path.exists() {
        bail!(
            "Project already initialized: {} exists at {}",
            PROJECT_CONFIG_FILE,
            manifest_path.display()
        );
    }

    create_project(&path, &name, args.verbose)?;

    println!("\n{} Created report project '{}'", green_check(), name);
    println!("  Path: {}", path.display());
    println!("\nTo get started:");
    println!("  reportc check");
    println!("  reportc compile");

    Ok(())
}

/// Create the project structure
fn create_project(path: &Path, name: &str, verbose: bool) -> Result<()> {
    fs::create_dir_all(path).context("Failed to create project directory")?;
    let source_dir = path.join(DEFAULT_SOURCE_DIR);
    fs::create_dir_all(&source_dir).context("Failed to create report source directory")?;

    if verbose {
        println!("Creating project structure...");
    }

    let manifest_path = path.join(PROJECT_CONFIG_FILE);
    fs::write(&manifest_path, generate_manifest(name))
        .with_context(|| format!("Failed to write {}", PROJECT_CONFIG_FILE))?;
    if verbose {
        println!("  Created {}", manifest_path.display());
    }

    let sample_path = source_dir.join("sample.jrxml");
    fs::write(&sample_path, generate_sample_design())
        .context("Failed to write sample report design")?;
    if verbose {
        println!("  Created {}", sample_path.display());
    }

    let gitignore_path = path.join(".gitignore");
    fs::write(&gitignore_path, generate_gitignore()).context("Failed to write .gitignore")?;
    if verbose {
        println!("  Created {}", gitignore_path.display());
    }

    Ok(())
}

/// Generate reportc.toml manifest content
fn generate_manifest(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
version = "0.1.0"
description = "Report design project"

[reports]
source_dir = "reports"
output_dir = "target/reports"

[engine]
command = "jasperc"
# classpath = ["lib/reports.jar"]
"#
    )
}

/// Generate a minimal sample report design
fn generate_sample_design() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<jasperReport name="sample" pageWidth="595" pageHeight="842" columnWidth="555"
              leftMargin="20" rightMargin="20" topMargin="20" bottomMargin="20">
    <title>
        <band height="60">
            <staticText>
                <reportElement x="0" y="0" width="555" height="30"/>
                <text><![CDATA[Sample report]]></text>
            </staticText>
        </band>
    </title>
</jasperReport>
"#
    .to_string()
}

/// Generate .gitignore content
fn generate_gitignore() -> String {
    r#"# Compiled report artifacts
/target/

# Editor files
*.swp
*.swo
*~
.idea/
.vscode/

# OS files
.DS_Store
Thumbs.db
"#
    .to_string()
}

/// Validate project name
fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Project name cannot be empty");
    }

    if name.len() > 64 {
        bail!("Project name must be 64 characters or less");
    }

    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_alphanumeric()) {
        bail!("Project name must start with a letter or number");
    }

    for c in name.chars() {
        if !c.is_alphanumeric() && c != '-' && c != '_' {
            bail!("Project name can only contain letters, numbers, hyphens, and underscores");
        }
    }

    if name.eq_ignore_ascii_case("reportc") {
        bail!("'{}' is a reserved project name", name);
    }

    Ok(())
}

/// Green checkmark for success messages
fn green_check() -> &'static str {
    "\u{2713}"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_project_name_valid() {
        assert!(validate_project_name("billing-reports").is_ok());
        assert!(validate_project_name("reports_2024").is_ok());
        assert!(validate_project_name("a").is_ok());
    }

    #[test]
    fn test_validate_project_name_invalid() {
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("-invalid").is_err());
        assert!(validate_project_name("has space").is_err());
        assert!(validate_project_name("has.dot").is_err());
    }

    #[test]
    fn test_validate_project_name_reserved() {
        assert!(validate_project_name("reportc").is_err());
        assert!(validate_project_name("REPORTC").is_err());
    }

    #[test]
    fn test_generate_manifest_contents() {
        let manifest = generate_manifest("test-proj");
        assert!(manifest.contains("name = \"test-proj\""));
        assert!(manifest.contains("[reports]"));
        assert!(manifest.contains("command = \"jasperc\""));
    }

    #[test]
    fn test_generated_manifest_parses() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&manifest_path, generate_manifest("parse-check")).unwrap();

        let config = reportc_config::ProjectConfig::load_from_file(&manifest_path).unwrap();
        assert_eq!(
            config.project.as_ref().map(|p| p.name.as_str()),
            Some("parse-check")
        );
    }

    #[test]
    fn test_create_project_structure() {
        let temp = TempDir::new().unwrap();
        let path = temp.path();

        create_project(path, "test-proj", false).unwrap();

        assert!(path.join(PROJECT_CONFIG_FILE).exists());
        assert!(path.join("reports/sample.jrxml").exists());
        assert!(path.join(".gitignore").exists());
    }

    #[test]
    fn test_run_creates_project() {
        let temp = TempDir::new().unwrap();

        let args = InitArgs {
            name: Some("my-reports".to_string()),
            path: temp.path().to_path_buf(),
            verbose: false,
        };

        run(args).unwrap();

        assert!(temp.path().join(PROJECT_CONFIG_FILE).exists());
        assert!(temp.path().join("reports").is_dir());
    }

    #[test]
    fn test_run_fails_if_manifest_exists() {
        let temp = TempDir::new().unwrap();

        fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            "[project]\nname = \"existing\"",
        )
        .unwrap();

        let args = InitArgs {
            name: Some("new-project".to_string()),
            path: temp.path().to_path_buf(),
            ..Default::default()
        };

        assert!(run(args).is_err());
    }
}
