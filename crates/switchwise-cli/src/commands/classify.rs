use clap::Args;
use serde_json::json;
use switchwise_core::TaskClassifier;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Window title of the next task
    title: String,
    /// URL of the next task
    #[arg(long)]
    url: Option<String>,
    /// Visible text snippet
    #[arg(long)]
    snippet: Option<String>,
    /// Print the category and backend as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ClassifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, base_dir) = super::load_config()?;
    let classifier = TaskClassifier::load(
        Some(&config.task_classifier_path(&base_dir)),
        config.models.max_sequence_length,
    );

    let category = classifier.predict(&args.title, args.url.as_deref(), args.snippet.as_deref());
    if args.json {
        let out = json!({ "category": category, "mode": classifier.mode() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{category}");
    }
    Ok(())
}
