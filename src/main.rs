//! CBN Builder
//!
//! Interactive loop: each line is an instruction applied to the current
//! Causal Bayesian Network, except for a handful of local commands.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cbn_builder::pipeline::TurnOutcome;
use cbn_builder::session::TurnReport;
use cbn_builder::{render, Cbn, CbnAssistant, Config, OpenAICompatibleProvider, Session};

const HELP: &str = "Commands: 'quit' | 'help' | 'json' | 'diagram' | 'history' | 'reset'";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cbn_builder=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Configuration error, refusing to start");
        }
    };
    info!("Loaded configuration: {:?}", config);

    let provider = Arc::new(OpenAICompatibleProvider::from_config(&config)?);
    let assistant = CbnAssistant::new(provider, &config);

    println!("\n{}", "═".repeat(60));
    println!("Causal Bayesian Network Builder v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {}", assistant.model());
    println!("{}\n", "═".repeat(60));
    let mut session = Session::new(assistant, Cbn::seagrass_restoration()).with_timing(config.interpretation_timing);

    let (welcome, interpretation) = session.welcome().await;
    println!("{}\n", welcome);
    println!("📖 Interpretation: {}\n", interpretation);
    println!("💡 {}\n", HELP);

    loop {
        print!("🧑 You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();

        match line.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "json" => println!("{}", render::pretty_json(session.current())),
            "diagram" => println!("{}", render::mermaid(session.current())),
            "history" => {
                if session.transcript().is_empty() {
                    println!("(no history)");
                } else {
                    println!("{}", session.transcript().format());
                }
            }
            "reset" => {
                session.reset();
                println!("🔄 Network reset to the starting scenario.");
            }
            _ => {
                let report = session.submit(line).await;
                print_report(&report);
            }
        }
        println!();
    }

    println!("👋 Goodbye!");
    Ok(())
}

fn print_report(report: &TurnReport) {
    match &report.outcome {
        TurnOutcome::Updated(update) => {
            println!(
                "✅ Network updated: {} nodes, {} edges",
                update.cbn.nodes.len(),
                update.cbn.edges.len()
            );
            if !update.defaulted_cpds.is_empty() {
                println!("   Default CPDs added for: {}", update.defaulted_cpds.join(", "));
            }
        }
        TurnOutcome::Failed(_) => println!("⚠️  Network unchanged."),
    }

    let parts = report.outcome.clone().into_parts();
    print_section("Suggestions", &parts.tentative_suggestions);
    print_section("Reflection prompts", &parts.reflection_prompts);
    print_section("Subclaims", &parts.subclaims);
    println!("📖 Interpretation: {}", report.interpretation);
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  • {}", item);
    }
}
