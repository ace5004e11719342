use std::path::PathBuf;

use clap::Parser;
use respondd_core::Category;

/// Publish UniFi access points to a Freifunk mesh map over respondd.
#[derive(Parser, Debug)]
#[command(name = "unifi-respondd", version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./unifi_respondd.yaml)
    #[arg(short, long, env = "UNIFI_RESPONDD_CONFIG_FILE", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Validate the configuration and exit
    #[arg(long, conflicts_with = "dump")]
    pub check_config: bool,

    /// Poll once and print the merged reply as JSON (all categories if none given)
    #[arg(long, num_args = 0.., value_name = "CATEGORY")]
    pub dump: Option<Vec<Category>>,
}

impl Cli {
    /// Categories to dump, `None` when not dumping.
    pub fn dump_categories(&self) -> Option<Vec<Category>> {
        self.dump.as_ref().map(|categories| {
            if categories.is_empty() {
                Category::ALL.to_vec()
            } else {
                categories.clone()
            }
        })
    }
}
