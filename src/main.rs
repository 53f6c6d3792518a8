//! getstarted - Entry point for the family database walkthrough.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use getstarted::cli::{failure_message, Args, DEMO_COMPLETE};
use getstarted::{connect, ConsolePrompt, Workflow};

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the walkthrough itself.
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&args) {
        Ok(()) => println!("{}", DEMO_COMPLETE),
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let store = connect(
        &args.endpoint,
        &args.key,
        args.connection_policy(),
        args.consistency,
    )?;

    let prompt = ConsolePrompt::stdio(!args.no_prompt);
    let mut workflow = Workflow::new(&store, prompt).with_throughput(args.throughput);

    let plan = args.plan();
    tracing::info!(database = %plan.database, container = %plan.container, "starting walkthrough");

    let report = workflow.run(&plan)?;
    tracing::info!(
        created = report.families_created.len(),
        results = report.query_results.len(),
        torn_down = report.torn_down,
        "walkthrough finished"
    );

    Ok(())
}
