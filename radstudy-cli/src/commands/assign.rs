//! Print the assignment an identifier receives

use anyhow::Result;
use clap::Args;
use radstudy_core::{PresentationPackage, StudyCatalog, present_demo, present_for};

use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Participant identifier
    #[arg(long, required_unless_present = "demo")]
    pub uid: Option<String>,

    /// Show the demo walkthrough: demo case set, always untimed
    #[arg(long, conflicts_with = "uid")]
    pub demo: bool,

    /// Print the full presentation package as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AssignArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let package = match args.uid {
        Some(uid) if !args.demo => {
            let catalog = StudyCatalog::load(&config.assets, &config.palette, &config.guidelines)?;
            present_for(&uid, &catalog, &config.condition)
        }
        _ => {
            let catalog = StudyCatalog::load_demo(&config.assets, &config.palette, &config.guidelines)?;
            present_demo(&catalog, &config.condition)
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&package)?);
    } else {
        print!("{}", summary(&package));
    }
    Ok(())
}

fn summary(package: &PresentationPackage) -> String {
    let mut out = format!(
        "seed:      {}\ncondition: {}\norder:     {}\nguidance:  {}\n",
        package.seed, package.condition, package.order, package.guidance_bits
    );
    for question in &package.questions {
        let marker = if question.show_guidance { "*" } else { " " };
        let text: String = question.case_text.chars().take(60).collect();
        out.push_str(&format!(
            "{:>3} {} Q{:<3} {}\n",
            question.position + 1,
            marker,
            question.case_index,
            text
        ));
    }
    out
}
