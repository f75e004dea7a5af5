//! Code related to the bundled demo studies and the CLI commands for interacting with them.
use super::{AnalyseOpts, handle_analyse_command};
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the demo studies.
static DEMOS_DIR: Dir<'static> = include_dir!("demos");

/// The available subcommands for managing demo studies.
#[derive(Subcommand)]
pub enum DemoSubcommands {
    /// List available demos.
    List,
    /// Provide information about the specified demo.
    Info {
        /// The name of the demo.
        name: String,
    },
    /// Extract a demo study to a new directory.
    Extract {
        /// The name of the demo to extract.
        name: String,
        /// The destination folder for the demo.
        new_path: Option<PathBuf>,
    },
    /// Run every assessment in a demo study.
    Run {
        /// The name of the demo to run.
        name: String,
        /// Other analyse options
        #[command(flatten)]
        opts: AnalyseOpts,
    },
}

impl DemoSubcommands {
    /// Execute the supplied demo subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_demo_list_command(),
            Self::Info { name } => handle_demo_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_demo_extract_command(&name, dest.as_deref())?,
            Self::Run { name, opts } => handle_demo_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// The names of the bundled demos
pub fn demo_names() -> impl Iterator<Item = &'static Path> {
    DEMOS_DIR.dirs().map(|dir| dir.path())
}

/// Handle the `demo list` command.
fn handle_demo_list_command() {
    for name in demo_names() {
        println!("{}", name.display());
    }
}

/// Get the README for the specified demo
fn demo_readme(name: &str) -> Result<&'static str> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    DEMOS_DIR
        .get_file(path)
        .context("Demo not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")
}

/// Handle the `demo info` command.
fn handle_demo_info_command(name: &str) -> Result<()> {
    println!("{}", demo_readme(name)?);

    Ok(())
}

/// Handle the `demo extract` command
fn handle_demo_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_demo(name, dest)
}

/// Extract the specified demo to a new directory
pub fn extract_demo(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in DEMOS_DIR whose name matches `name`.
    let sub_dir = DEMOS_DIR.get_dir(name).context("Demo not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    // Copy the contents of the subdirectory to the destination
    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::Dir(dir) => {
                bail!("Subdirectories in demos not supported: {}", dir.path().display())
            }
            DirEntry::File(f) => {
                let file_name = f.path().file_name().context("Invalid file in demo")?;
                let file_path = new_path.join(file_name);
                fs::write(&file_path, f.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `demo run` command.
///
/// The demo is extracted to a temporary folder and analysed from there. Unless an output folder is
/// given, the reports are written under the current folder as for any other study.
pub fn handle_demo_run_command(
    name: &str,
    opts: &AnalyseOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let study_path = temp_dir.path().join(name);
    extract_demo(name, &study_path)?;
    handle_analyse_command(&study_path, opts, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_names() {
        assert!(demo_names().any(|name| name == Path::new("delhi")));
    }

    #[test]
    fn test_demo_readme() {
        assert!(!demo_readme("delhi").unwrap().is_empty());
        assert!(demo_readme("atlantis").is_err());
    }

    #[test]
    fn test_extract_demo() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("delhi");
        extract_demo("delhi", &dest).unwrap();
        for file_name in ["parameters.toml", "policies.toml", "cities.csv", "series.csv"] {
            assert!(dest.join(file_name).is_file());
        }

        // Won't overwrite
        assert!(extract_demo("delhi", &dest).is_err());
    }
}
