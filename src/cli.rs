use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ccss-taxonomy",
    version,
    about = "Assemble and check the Common Core standards hierarchy from XML documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Load(LoadArgs),
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    /// Glob pattern selecting XML documents; repeatable.
    #[arg(long = "path", required = true)]
    pub patterns: Vec<String>,

    #[arg(long, default_value = ".cache/ccss/manifests/document_inventory.json")]
    pub manifest_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[arg(long = "path", required = true)]
    pub patterns: Vec<String>,

    /// Documents loaded in a second pass into the same registry.
    #[arg(long = "then")]
    pub then_patterns: Vec<String>,

    /// Clear the registry before the `--then` pass.
    #[arg(long, default_value_t = false)]
    pub isolated: bool,

    /// Reference id to print with its parent and children; repeatable.
    #[arg(long = "show")]
    pub show: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long = "path", required = true)]
    pub patterns: Vec<String>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Fail when any defect is found.
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}
