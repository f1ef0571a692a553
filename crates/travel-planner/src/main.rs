use anyhow::Context as _;
use clap::Parser;
use travel_planner::app::{SessionOptions, run_session};
use travel_planner::cli::Cli;
use travel_planner::config::{self, PlannerConfig};
use travel_planner::form::collect_trip;
use travel_planner::model::load_model;
use travel_planner::observability::{LogSettings, init_observability};
use travel_planner::planner::ItineraryPlanner;
use travel_planner::prompt::{build_prompt, generation_params};
use travel_planner::ui::TerminalUi;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    config::init();
    init_observability(&LogSettings::from_env());

    let cli = Cli::parse();
    let config = PlannerConfig::from_env()
        .context("invalid planner configuration")?
        .apply(cli.overrides());
    let draft = cli.draft()?;
    let today = chrono::Local::now().date_naive();
    let mut ui = TerminalUi::stdio();

    if cli.print_prompt {
        let request = if cli.non_interactive {
            draft.into_request(today)
        } else {
            collect_trip(&mut ui, draft, today)?
        };
        let trip = request.validate()?;
        println!("{}", build_prompt(&trip));
        println!("{}", serde_json::to_string_pretty(&generation_params(&trip))?);
        return Ok(());
    }

    let model = load_model(&config, &mut ui).await;
    let planner = ItineraryPlanner::new(model);
    let summary = run_session(
        &planner,
        &mut ui,
        draft,
        SessionOptions {
            interactive: !cli.non_interactive,
            image_path: config.image_path.as_deref(),
            today,
        },
    )
    .await?;

    if cli.non_interactive && summary.failed > 0 {
        anyhow::bail!("no itinerary was generated");
    }
    Ok(())
}
