use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use testbridge::report::TestStatus;
use testbridge::{
    data, flatten, load_report, mailer, settings, squash, summarize, RunLogger, Settings,
};

#[derive(Parser)]
#[command(name = "testbridge")]
#[command(version = "0.1.0")]
#[command(about = "Browser E2E test toolkit: report flattening, email and Squash TM reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a runner report and dispatch the configured reporters
    Report {
        /// Path to the runner-produced JSON report
        results: PathBuf,

        /// Send the HTML report email
        #[arg(long, default_value = "false")]
        email: bool,

        /// Upload results to Squash TM
        #[arg(long, default_value = "false")]
        squash: bool,

        /// Print the run summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Extra files to attach to the report email
        #[arg(long)]
        attach: Vec<PathBuf>,

        /// Override the email template path
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Load and print a named test-data file
    Data {
        /// Data file base name (without extension)
        base: String,

        /// Array field to extract
        #[arg(short, long)]
        key: Option<String>,

        /// Format override (json, yaml)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Verify SMTP reachability without sending anything
    CheckMail,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::resolve()?;

    match cli.command {
        Commands::Report {
            results,
            email,
            squash: to_squash,
            json,
            attach,
            template,
        } => {
            let logger = RunLogger::new(std::path::Path::new("logs"));
            run_report(
                &settings, &logger, &results, email, to_squash, json, attach, template,
            )
            .await?;
        }

        Commands::Data { base, key, format } => {
            let format_override = match format.as_deref() {
                Some(f) => Some(
                    settings::DataFormat::parse(f)
                        .ok_or_else(|| anyhow::anyhow!("Unknown data format: {}", f))?,
                ),
                None => None,
            };

            let format = format_override.unwrap_or(settings.data_format);
            let loader = data::DataLoader::new(&settings.data_root, format);
            match key {
                Some(key) => {
                    let records = loader.load_array(&base, &key)?;
                    println!("{}", serde_json::to_string_pretty(&records)?);
                }
                None => {
                    let record = loader.load(&base, None)?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
            }
        }

        Commands::CheckMail => {
            let logger = RunLogger::console_only();
            let reporter = mailer::EmailReporter::new(&settings);
            if !reporter.verify(&logger).await {
                eprintln!("{} SMTP server not reachable", "✗".red().bold());
                std::process::exit(1);
            }
            println!("{} SMTP server reachable", "✓".green().bold());
        }
    }

    Ok(())
}

async fn run_report(
    settings: &Settings,
    logger: &RunLogger,
    results_path: &std::path::Path,
    email: bool,
    to_squash: bool,
    json: bool,
    mut attach: Vec<PathBuf>,
    template: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!(
        "{} Parsing report: {}",
        "▶".green().bold(),
        results_path.display()
    );

    let report = load_report(results_path)?;
    let results = flatten(&report);
    let summary = summarize(&report, &results, &settings.environment);

    print_summary_table(&summary, &results);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    // The two reporters are independent; neither outcome gates the other
    // and neither can fail the run.
    if email {
        let mut reporter = mailer::EmailReporter::new(settings);
        if let Some(path) = template {
            reporter = reporter.with_template_path(path);
        }

        // Failure screenshots ride along with explicitly attached files
        for result in &results {
            if result.status == TestStatus::Failed {
                if let Some(path) = &result.screenshot_path {
                    attach.push(PathBuf::from(path));
                }
            }
        }

        if reporter.verify(logger).await {
            let sent = reporter.send(&summary, &results, &attach, logger).await;
            if sent {
                println!("{} Report email sent", "✓".green());
            } else {
                println!("{} Report email not sent", "⚠".yellow());
            }
        } else {
            println!("{} SMTP unreachable, skipping email", "⚠".yellow());
        }
    }

    if to_squash {
        let client = squash::SquashClient::new(settings);
        let reported = client.report_ddt_results(&results, logger).await;
        println!(
            "{} Squash TM: {}/{} results reported",
            if reported == results.len() {
                "✓".green()
            } else {
                "⚠".yellow()
            },
            reported,
            results.len()
        );
    }

    Ok(())
}

fn print_summary_table(
    summary: &testbridge::report::RunSummary,
    results: &[testbridge::report::FlatResult],
) {
    println!();
    for result in results {
        let (icon, name) = match result.status {
            TestStatus::Passed => ("✓".green(), result.name.normal()),
            TestStatus::Failed => ("✗".red(), result.name.red()),
            TestStatus::Skipped => ("○".yellow(), result.name.dimmed()),
        };
        let retries = if result.retry_count > 0 {
            format!(" ({} retries)", result.retry_count).yellow().to_string()
        } else {
            String::new()
        };
        println!("  {} {} [{}ms]{}", icon, name, result.duration_ms, retries);
        if let Some(error) = &result.error {
            println!("      {}", error.red().dimmed());
        }
    }

    println!(
        "\n  {} total, {} passed, {} failed, {} skipped ({})",
        summary.total,
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.skipped.to_string().yellow(),
        summary.environment.cyan()
    );
}
