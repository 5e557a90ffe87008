use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "embedded-deps",
    about = "Inventory embedded third-party packages and produce a license manifest",
    version
)]
pub struct Cli {
    /// Project path to scan (must contain package-lock.json or node_modules)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory receiving the manifest and notices [default: project path]
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Config file [default: ./.embedded-deps/config.toml, fallback ~/.config/embedded-deps/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Manifest file name [default: embedded-dependencies.json]
    #[arg(long, value_name = "NAME")]
    pub output_file_name: Option<String>,

    /// Also write THIRD-PARTY-NOTICES.html
    #[arg(long)]
    pub generate_license_file: bool,

    /// Include packages marked as dev dependencies in the lockfile
    #[arg(long)]
    pub include_dev: bool,

    /// Look up missing declared licenses in the npm registry
    #[arg(long)]
    pub online: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Show all packages (not just copyleft exposure) and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            output_file_name: self.output_file_name.clone(),
            generate_license_file: self.generate_license_file,
            include_dev: self.include_dev,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
