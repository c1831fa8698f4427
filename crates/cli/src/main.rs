use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wander_agents::{build_planner, ClientConfig, LivePlanner};
use wander_core::{ExploreQuery, ExploreRequest, RecommendRequest};
use wander_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "wanderwise")]
#[command(about = "WanderWise travel planner CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Suggest destinations that fit a budget.
    Recommend {
        #[arg(long)]
        budget: u32,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        #[arg(long, default_value = "")]
        keywords: String,
    },
    /// Suggest cafes, restaurants and sights in a city.
    Explore {
        #[arg(long)]
        city: String,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        travelers: Option<String>,
        /// Query the places API directly instead of the language model.
        #[arg(long)]
        places: bool,
    },
    /// Ask the assistant; without a message, start an interactive session.
    Chat { message: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("wanderwise");
    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    let planner = build_planner(&config, AppMetrics::shared())?;

    match cli.command {
        Command::Recommend {
            budget,
            travelers,
            keywords,
        } => {
            anyhow::ensure!(travelers >= 1, "--travelers must be at least 1");
            let request = RecommendRequest {
                budget,
                travelers,
                keywords: keywords.trim().to_string(),
            };
            let suggestions = planner.recommend(&request).await?;
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Command::Explore {
            city,
            keywords,
            budget,
            travelers,
            places,
        } => {
            let request = ExploreRequest::try_from(ExploreQuery {
                city: Some(city),
                keywords,
                budget,
                travelers,
            })
            .context("invalid explore arguments")?;
            let output = if places {
                serde_json::to_string_pretty(&planner.explore_places(&request).await?)?
            } else {
                serde_json::to_string_pretty(&planner.explore(&request).await?)?
            };
            println!("{output}");
        }
        Command::Chat { message: Some(message) } => {
            let reply = planner.chat(message.trim()).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Chat { message: None } => run_chat(&planner).await?,
    }

    Ok(())
}

async fn run_chat(planner: &LivePlanner) -> Result<()> {
    println!("WanderWise chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = planner.chat(message).await?;
        println!("\n{}\n", reply.reply);

        if let Some(venue) = reply.venue {
            println!("Suggested venue: {}", venue.name);
            if let Some(address) = venue.formatted_address {
                println!("  {address}");
            }
            println!("  {}\n", venue.maps_url);
        }
    }

    Ok(())
}
