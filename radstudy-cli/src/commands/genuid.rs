//! Issue a participant identifier from an email address

use anyhow::Result;
use clap::Args;
use radstudy_core::issue_identifier;

#[derive(Debug, Args)]
pub struct GenuidArgs {
    /// Participant email
    #[arg(short = 'u', long)]
    pub email: String,

    /// Print salt and identifier as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GenuidArgs) -> Result<()> {
    let issued = issue_identifier(&args.email);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&issued)?);
    } else {
        println!("{}", issued.identifier);
    }
    Ok(())
}
