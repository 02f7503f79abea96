use clap::Args;
use switchwise_core::{decide, FocusState, Suitability, TaskCategory};

#[derive(Args)]
pub struct DecideArgs {
    /// Current focus state (e.g. "tired", "highly_focused")
    state: String,
    /// Task category label
    category: String,
    /// Suitability label
    suitability: String,
    /// Print the decision as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DecideArgs) -> Result<(), Box<dyn std::error::Error>> {
    let state: FocusState = args.state.parse()?;
    let decision = decide(
        state,
        &TaskCategory::new(args.category),
        &Suitability::new(args.suitability),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        println!("rule:    {}", decision.rule_id);
        println!("type:    {}", decision.recommendation.kind);
        println!("reason:  {}", decision.reason);
        println!("message: {}", decision.recommendation.message);
    }
    Ok(())
}
