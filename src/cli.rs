use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::profile::ProfileId;

#[derive(Debug, Parser)]
#[command(
    name = "scan-profiles",
    version,
    about = "Validate and manage scan configuration profiles"
)]
pub struct Cli {
    #[arg(long, global = true, help = "User acting on the profiles")]
    pub owner: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Plugin registry: catalog file or dispatcher URL"
    )]
    pub registry: Option<String>,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a draft without storing it
    Validate(DraftArgs),
    /// Store a new profile
    Create(CreateArgs),
    /// Replace every field of a stored profile
    Update(UpdateArgs),
    List(ListArgs),
    Show(IdArgs),
    Delete(IdArgs),
    /// Store a copy of a visible profile
    Copy(CopyArgs),
    /// Store every draft of a JSON file, or none of them
    Import(DraftArgs),
    MakeDefault(IdArgs),
    Share(ShareArgs),
    /// List the plugins and modules the registry knows
    Registry,
    /// Show or change persisted settings
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[arg(help = "Profile draft (JSON)")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(
        help = "Profile draft (JSON)",
        required_unless_present = "from_default",
        conflicts_with = "from_default"
    )]
    pub file: Option<PathBuf>,
    #[arg(long, requires = "name", help = "Start from the default profile")]
    pub from_default: bool,
    #[arg(long, help = "Profile name, overrides the draft's")]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(help = "Profile id")]
    pub id: ProfileId,
    #[arg(help = "Complete profile draft (JSON)")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Only global profiles")]
    pub global: bool,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[arg(help = "Profile id")]
    pub id: ProfileId,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    #[arg(help = "Profile id")]
    pub id: ProfileId,
    #[arg(long, help = "Name of the copy")]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShareArgs {
    #[arg(help = "Profile id")]
    pub id: ProfileId,
    #[arg(long = "with", required = true, value_delimiter = ',', num_args = 1.., help = "Users to share with")]
    pub users: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long, help = "Persist the default owner")]
    pub default_owner: Option<String>,
    #[arg(long, help = "Persist the registry source")]
    pub set_registry: Option<String>,
}
