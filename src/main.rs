use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use ethics_grade::error::{ConfigurationError, EngineError};
use ethics_grade::scoring::parse_weight_override;
use ethics_grade::session::Session;
use ethics_grade::source::SourceError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum SortOrder {
    /// Highest total first
    #[default]
    Total,
    /// Industry, then rating
    Industry,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every company and print the table (default if no subcommand)
    Table {
        /// Override a section weight, e.g. --weight "Governance=40" (repeatable)
        #[arg(short, long = "weight", value_name = "SECTION=WEIGHT", value_parser = parse_weight_override)]
        weights: Vec<(String, f64)>,

        #[arg(long, value_enum, default_value_t = SortOrder::Total)]
        sort: SortOrder,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the rating distribution and industry averages
    Charts {
        /// Override a section weight (repeatable)
        #[arg(short, long = "weight", value_name = "SECTION=WEIGHT", value_parser = parse_weight_override)]
        weights: Vec<(String, f64)>,
    },
    /// List the models the data service knows about
    Models,
    /// Save section weights to a custom model
    Save {
        /// Section weight to save (repeatable); unlisted sections keep the model's weight
        #[arg(short, long = "weight", value_name = "SECTION=WEIGHT", value_parser = parse_weight_override, required = true)]
        weights: Vec<(String, f64)>,
    },
    /// Interactive dashboard for tuning section weights
    Dashboard,
}

#[derive(Parser, Debug)]
#[command(name = "ethics-grade")]
#[command(about = "Score companies against a weighted ethics rubric", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter, e.g. "debug" or "ethics_grade=trace" (overrides --verbose)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Path to config file (defaults to ~/.config/ethics-grade/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Rubric model to score with (defaults to the configured default model)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Map a failure to its exit code: bad rubric, weights or config files are
/// configuration errors; everything else came from the data service.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<SourceError>().is_some() {
        EXIT_NETWORK
    } else if err.downcast_ref::<EngineError>().is_some()
        || err.downcast_ref::<ConfigurationError>().is_some()
    {
        EXIT_CONFIG
    } else {
        EXIT_NETWORK
    }
}

fn fail(what: &str, err: anyhow::Error) -> ! {
    eprintln!("{}: {:#}", what, err);
    std::process::exit(exit_code_for(&err));
}

fn apply_weights(session: &mut Session, weights: &[(String, f64)]) {
    let overrides = weights.iter().map(|(section, weight)| (section.as_str(), *weight));
    if let Err(errors) = session.apply_overrides(overrides) {
        eprintln!("Weight override errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        let sections: Vec<&str> = session.rubric().section_names().collect();
        eprintln!("Sections in this model: {}", sections.join(", "));
        std::process::exit(EXIT_CONFIG);
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+). An error
    // only means a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Table {
        weights: Vec::new(),
        sort: SortOrder::default(),
        format: OutputFormat::default(),
    });
    let start_time = Instant::now();

    if let Err(e) = ethics_grade::logging::init_tracing(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("Logging error: {:#}", e);
        std::process::exit(EXIT_CONFIG);
    }

    // Load config
    let config = match ethics_grade::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = ethics_grade::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let model = cli.model.unwrap_or_else(|| config.default_model.clone());
    tracing::debug!(base_url = %config.base_url, model = %model, "starting");

    let client = match ethics_grade::source::Client::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create data service client: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = ethics_grade::output::should_use_colors();

    if let Commands::Models = command {
        match client.list_models().await {
            Ok(models) => {
                println!(
                    "{}",
                    ethics_grade::output::format_model_list(&models, &config.default_model, use_colors)
                );
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => fail("Failed to list models", e),
        }
    }

    let snapshot = match ethics_grade::fetch::load_snapshot(&client, &model).await {
        Ok(s) => s,
        Err(e) => fail("Failed to load data", e),
    };
    let fetched_at = snapshot.fetched_at;
    let models = snapshot.model_names();
    let mut session = Session::from_snapshot(
        snapshot,
        config.collision_policy(),
        client.is_read_only(&model),
    );

    // Route based on subcommand
    match command {
        Commands::Table {
            weights,
            sort,
            format,
        } => {
            apply_weights(&mut session, &weights);
            let mut table = match session.table() {
                Ok(t) => t,
                Err(e) => fail("Scoring failed", e.into()),
            };
            match sort {
                SortOrder::Total => table.sort_by_total_desc(),
                SortOrder::Industry => table.sort_by_industry_rating(),
            }

            let output = match format {
                OutputFormat::Table => {
                    ethics_grade::output::format_score_table(&table, use_colors)
                }
                OutputFormat::Tsv => ethics_grade::output::format_tsv(&table),
                OutputFormat::Json => match ethics_grade::output::format_json(&table) {
                    Ok(json) => json,
                    Err(e) => fail("Failed to encode JSON", e.into()),
                },
            };
            if !output.is_empty() {
                println!("{}", output);
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Total: {} companies in {:?}", table.len(), start_time.elapsed());
            }
        }
        Commands::Charts { weights } => {
            apply_weights(&mut session, &weights);
            let table = match session.table() {
                Ok(t) => t,
                Err(e) => fail("Scoring failed", e.into()),
            };
            println!("{}", ethics_grade::output::format_rating_chart(&table, use_colors));
            println!();
            println!("{}", ethics_grade::output::format_industry_chart(&table, use_colors));
            if let Some(summary) = table.summary() {
                println!();
                println!("{}", ethics_grade::output::format_summary(&summary));
            }
        }
        Commands::Save { weights } => {
            apply_weights(&mut session, &weights);
            let payload = match session.save_payload() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if let Err(e) = client.save_weights(&model, &payload).await {
                fail("Failed to save weights", e);
            }
            println!("Saved weights to {}", model);
        }
        Commands::Dashboard => {
            let app = ethics_grade::tui::App::new(session, fetched_at, models);
            if let Err(e) = ethics_grade::tui::run_dashboard(app, client).await {
                fail("Dashboard error", e);
            }
        }
        Commands::Models => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
