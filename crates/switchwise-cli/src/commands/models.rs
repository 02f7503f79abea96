use clap::Args;

#[derive(Args)]
pub struct ModelsArgs {
    /// Print the status as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ModelsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, base_dir) = super::load_config()?;
    let analyzer = switchwise_core::Analyzer::from_config(&config, &base_dir);
    let status = analyzer.status();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "task classifier: {} ({})",
        status.classifier_mode,
        config.task_classifier_path(&base_dir).display()
    );
    println!(
        "fusion model:    {} ({})",
        if status.fusion_model_loaded { "loaded" } else { "unavailable" },
        config.fusion_model_path(&base_dir).display()
    );
    Ok(())
}
