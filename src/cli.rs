use crate::common::CommonParams;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::factory::ServiceFactory;
use crate::fallback::SmartAnalyzer;
use crate::image::ImageFile;
use crate::providers::Provider;
use crate::ui;
use crate::{log_debug, log_error};
use anyhow::Context;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "design-lens-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Design Lens: AI-powered design diagnosis",
    long_about = "Design Lens scores a design image across color, layout, typography, visual hierarchy and brand consistency using a hosted vision model or an offline generator.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Echo log messages to stdout
    #[arg(
        long = "log-stdout",
        global = true,
        help = "Echo log messages to stdout"
    )]
    pub log_stdout: bool,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Diagnose a design image
    #[command(
        about = "Diagnose a design image",
        long_about = "Score a PNG, JPEG or PDF design across five dimensions and list issues and suggestions for each.",
        after_help = get_dynamic_help()
    )]
    Analyze {
        #[command(flatten)]
        common: CommonParams,

        /// Image or PDF to analyze
        #[arg(help = "Image or PDF to analyze")]
        file: PathBuf,

        /// Fall back across every hosted provider with a configured key
        #[arg(
            long,
            conflicts_with = "provider",
            help = "Try hosted providers in fallback order until one succeeds"
        )]
        smart: bool,

        /// Print the raw diagnosis as JSON
        #[arg(long, help = "Print the diagnosis as JSON")]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long, help = "Write the report to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// List providers and their configuration status
    #[command(about = "List analysis providers and their status")]
    Providers,

    /// Configure Design Lens settings and providers
    #[command(
        about = "Configure Design Lens settings and providers",
        long_about = "Configure the default provider and its API key, endpoint and model."
    )]
    Config {
        #[command(flatten)]
        common: CommonParams,

        /// Set API key for the default provider
        #[arg(long, help = "Set API key for the default provider")]
        api_key: Option<String>,

        /// Set endpoint override for the default provider
        #[arg(long, help = "Set endpoint override for the default provider")]
        api_url: Option<String>,

        /// Set model for the default provider
        #[arg(long, help = "Set model for the default provider")]
        model: Option<String>,

        /// Print the effective configuration with keys masked
        #[arg(short, long, help = "Print the effective configuration")]
        print: bool,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Generate dynamic help listing the providers
fn get_dynamic_help() -> String {
    let providers_list = Provider::all_names()
        .iter()
        .map(|p| format!("{}", p.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable providers: {providers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    configure_logging(&cli)?;

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["design-lens", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            common,
            file,
            smart,
            json,
            output,
        } => handle_analyze(&common, file, smart, json, output).await,
        Commands::Providers => handle_providers(),
        Commands::Config {
            common,
            api_key,
            api_url,
            model,
            print,
        } => handle_config(&common, api_key, api_url, model, print),
    }
}

/// Log the detailed failure, surface the user-facing message
fn into_user_error(error: AnalysisError) -> anyhow::Error {
    log_error!("Analysis failed: {}", error);
    anyhow::anyhow!(error.user_message())
}

/// Handle the `Analyze` command
async fn handle_analyze(
    common: &CommonParams,
    file: PathBuf,
    smart: bool,
    json: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    log_debug!(
        "Handling 'analyze' for {} with common: {:?}, smart: {}",
        file.display(),
        common,
        smart
    );

    let mut config = Config::load()?;
    common.apply_to_config(&mut config)?;

    let image = ImageFile::from_path(&file, config.analysis.max_file_size)
        .await
        .map_err(into_user_error)?;

    let outcome = if smart {
        let analyzer = SmartAnalyzer::from_config(&config).map_err(into_user_error)?;
        let spinner = ui::create_spinner(&format!(
            "Analyzing {} ({})",
            image.name(),
            analyzer
                .providers()
                .iter()
                .map(Provider::name)
                .collect::<Vec<_>>()
                .join(" → ")
        ));
        let outcome = analyzer.analyze(&image).await;
        spinner.finish_and_clear();
        outcome
    } else {
        let provider = config.default_provider;
        let factory = ServiceFactory::new(config);
        let spinner = ui::create_spinner(&format!("Analyzing {} with {provider}", image.name()));
        let outcome = factory.analyze(&image, None).await;
        spinner.finish_and_clear();
        outcome
    };
    let result = outcome.map_err(into_user_error)?;

    let rendered = if json {
        serde_json::to_string_pretty(&result)?
    } else {
        ui::format_report(&result)
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            ui::print_success(&format!("Report saved to {}", path.display()));
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Handle the `Providers` command
fn handle_providers() -> anyhow::Result<()> {
    let config = Config::load()?;

    println!("{}", "Analysis providers".magenta().bold());
    for provider in Provider::ALL {
        let provider_config = config.provider_config(*provider);
        let marker = if *provider == config.default_provider {
            "●".green().bold()
        } else {
            "○".normal()
        };
        let status = match (provider.is_remote(), provider_config.has_api_key()) {
            (false, _) => "offline".cyan(),
            (true, true) => "key configured".green(),
            (true, false) => "no key".yellow(),
        };
        let model = provider_config.effective_model().unwrap_or("-");
        println!("  {marker} {:<8} {:<24} {status}", provider.name(), model);
    }

    let order = config
        .fallback_configs()
        .iter()
        .map(|c| c.provider.name())
        .collect::<Vec<_>>();
    if order.is_empty() {
        ui::print_warning("Fallback: no hosted provider has an API key");
    } else {
        ui::print_info(&format!("Fallback order: {}", order.join(" → ")));
    }
    Ok(())
}

/// Handle the `Config` command
fn handle_config(
    common: &CommonParams,
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
    print: bool,
) -> anyhow::Result<()> {
    log_debug!(
        "Handling 'config' command with common: {:?}, api_url: {:?}, model: {:?}",
        common,
        api_url,
        model
    );

    // Environment overrides are layered on for display only, never saved
    let mut stored = Config::load_file()?;
    let changes_made = apply_config_changes(&mut stored, common, api_key, api_url, model)?;

    if changes_made {
        stored.save()?;
        ui::print_success("Configuration updated successfully.");
    }

    if print || !changes_made {
        let effective = stored.with_env_from(|name| std::env::var(name).ok())?;
        println!("{}", toml::to_string_pretty(&effective.masked())?);
    }
    Ok(())
}

/// Apply `config` subcommand arguments to the stored configuration
fn apply_config_changes(
    stored: &mut Config,
    common: &CommonParams,
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
) -> anyhow::Result<bool> {
    let mut changes_made = common.apply_to_config(stored)?;

    if api_key.is_some() || api_url.is_some() || model.is_some() {
        stored.update(None, api_key, api_url, model);
        changes_made = true;
    }

    if changes_made {
        stored.default_provider_config().effective_endpoint()?;
    }
    Ok(changes_made)
}

/// Route log output according to the global flags
fn configure_logging(cli: &Cli) -> anyhow::Result<()> {
    if !cli.log && !cli.log_stdout {
        crate::logger::disable_logging();
        return Ok(());
    }

    crate::logger::enable_logging();
    crate::logger::set_log_to_stdout(cli.log_stdout);
    if cli.log {
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
    }

    if let Ok(config) = Config::load() {
        crate::logger::set_verbose_logging(config.logging.verbose);
        if config.logging.verbose {
            log_debug!("Verbose logging enabled - will show HTTP client logs");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from(["design-lens", "analyze", "poster.png", "--provider", "google", "--json"]);
        let Some(Commands::Analyze {
            common, file, smart, json, output,
        }) = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(common.provider.as_deref(), Some("gemini"));
        assert_eq!(file, PathBuf::from("poster.png"));
        assert!(!smart && json && output.is_none());
    }

    #[test]
    fn test_config_changes_keep_env_keys_out() {
        let mut stored = Config::default();
        let common = CommonParams {
            provider: Some("openai".to_string()),
        };
        let changed = apply_config_changes(
            &mut stored,
            &common,
            None,
            None,
            Some("gpt-4o-mini".to_string()),
        )
        .expect("valid changes");
        assert!(changed);

        let effective = stored
            .with_env_from(|name| (name == "OPENAI_API_KEY").then(|| "sk-env-only".to_string()))
            .expect("valid env");
        assert!(effective.default_provider_config().has_api_key());

        let saved = toml::to_string_pretty(&stored).expect("serializes");
        assert!(!saved.contains("sk-env-only"), "{saved}");
        assert!(saved.contains("gpt-4o-mini"));
    }

    #[test]
    fn test_bad_endpoint_is_rejected_before_save() {
        let mut stored = Config::default();
        let common = CommonParams {
            provider: Some("claude".to_string()),
        };
        let result = apply_config_changes(
            &mut stored,
            &common,
            None,
            Some("not a url".to_string()),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_log_stdout_flag_enables_stdout_echo() {
        let cli = Cli::parse_from(["design-lens", "--log-stdout", "providers"]);
        assert!(cli.log_stdout && !cli.log);
        configure_logging(&cli).expect("no log file needed");
        assert!(crate::logger::is_logging_to_stdout());
        crate::logger::set_log_to_stdout(false);
        crate::logger::disable_logging();
    }

    #[test]
    fn test_smart_conflicts_with_provider() {
        let parsed = Cli::try_parse_from([
            "design-lens",
            "analyze",
            "poster.png",
            "--smart",
            "--provider",
            "claude",
        ]);
        assert!(parsed.is_err());
    }
}
