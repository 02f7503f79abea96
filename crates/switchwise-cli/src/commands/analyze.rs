use std::io::Read;
use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Read the JSON payload from a file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let body = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };

    let analyzer = switchwise_core::Analyzer::load()?;
    let response = analyzer.analyze_payload(&body)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
