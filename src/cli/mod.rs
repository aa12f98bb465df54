//! Command-line interface for sumoql
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading, environment overrides and validation
//! - Connection resolution for the selected profile
//! - Local subcommands (version, completion, config)

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::client::{region_names, resolve_endpoint};
use crate::config::{Config, LogLevel, ResolvedConnection};
use crate::error::Result;

/// Query assistant for a log-analytics service
#[derive(Parser, Debug)]
#[command(
    name = "sumoql",
    version,
    about = "Query assistant for Sumo Logic-style log analytics",
    long_about = "Fetches folders, custom fields and partitions from the remote API and keeps
per-profile autocomplete state for writing log queries."
)]
pub struct CliArgs {
    /// Profile to use for credentials and completion state
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Deployment region (us1, us2, eu, au, de, jp, ca, in, fed, kr, ch)
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Custom API endpoint URL, overrides the region
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Access id for Basic authentication
    #[arg(long, global = true, value_name = "ID")]
    pub access_id: Option<String>,

    /// Access key for Basic authentication
    #[arg(long, global = true, value_name = "KEY")]
    pub access_key: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for sumoql
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a folder report (personal folder by default)
    Folder {
        /// Folder id
        #[arg(value_name = "ID")]
        id: Option<String>,

        /// Print the raw folder JSON instead of the report
        #[arg(long)]
        json: bool,
    },

    /// Fetch custom fields and partitions into the completion store
    Sync,

    /// Run a search job and learn field names from its results
    Search {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Start of the time range (ISO 8601 or epoch milliseconds)
        #[arg(long, value_name = "TIME")]
        from: String,

        /// End of the time range (ISO 8601 or epoch milliseconds)
        #[arg(long, value_name = "TIME")]
        to: String,

        /// Time zone for the range, e.g. UTC or Europe/Berlin
        #[arg(long, value_name = "TZ")]
        time_zone: Option<String>,

        /// Maximum number of rows to fetch
        #[arg(long, value_name = "N")]
        limit: Option<u32>,
    },

    /// List completion suggestions for the active profile
    Suggest {
        /// Only show names starting with this prefix
        #[arg(value_name = "PREFIX")]
        prefix: Option<String>,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the stored completion state of a profile
    Forget {
        /// Profile name (defaults to the active profile)
        #[arg(value_name = "PROFILE")]
        profile: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,

        /// List configured profile names
        #[arg(long)]
        list_profiles: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file, environment and arguments
    ///
    /// Later sources win: defaults, then the file, then `SUMOQL_*`
    /// environment variables, then command-line flags.
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.apply_env();

        Self::apply_args_to_config(&mut config, args);

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
        }

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Name of the active profile
    pub fn profile(&self) -> String {
        self.config
            .connection
            .profile_name(self.args.profile.as_deref())
    }

    /// Resolve endpoint and credentials for the active profile
    ///
    /// Profile settings from the file override top-level settings;
    /// explicit command-line flags override both.
    ///
    /// # Returns
    /// * `Result<ResolvedConnection>` - Connection settings or a config error
    pub fn connection(&self) -> Result<ResolvedConnection> {
        let mut resolved = self
            .config
            .connection
            .resolve(self.args.profile.as_deref())?;

        if let Some(target) = self.args.endpoint.as_ref().or(self.args.region.as_ref()) {
            resolved.endpoint = resolve_endpoint(target)?;
        }
        if let Some(id) = &self.args.access_id {
            resolved.access_id = id.clone();
        }
        if let Some(key) = &self.args.access_key {
            resolved.access_key = key.clone();
        }

        Ok(resolved)
    }

    /// Apply CLI arguments to configuration
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    /// * `args` - Parsed arguments
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
        Self::apply_connection_args(config, args);
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Apply connection-related CLI arguments to configuration
    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
        if let Some(region) = &args.region {
            config.connection.region = region.clone();
        }
        if let Some(endpoint) = &args.endpoint {
            config.connection.endpoint = Some(endpoint.clone());
        }
        if let Some(id) = &args.access_id {
            config.connection.access_id = Some(id.clone());
        }
        if let Some(key) = &args.access_key {
            config.connection.access_key = Some(key.clone());
        }
    }

    /// Handle subcommands that need neither the network nor the store
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Commands::Version => {
                self.show_version();
                Ok(true)
            }
            Commands::Completion { shell } => {
                print!("{}", completion::generate_completion(shell)?);
                Ok(true)
            }
            Commands::Config {
                show,
                validate,
                list_profiles,
            } => {
                self.handle_config_command(*show, *validate, *list_profiles)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("sumoql version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// With no flag set, the effective configuration is shown.
    fn handle_config_command(&self, show: bool, validate: bool, list_profiles: bool) -> Result<()> {
        if list_profiles {
            for name in self.config.connection.list_profiles() {
                println!("{}", name);
            }
            return Ok(());
        }

        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return;
        }

        match Config::load_from_file(Some(path.as_path())) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!("Active profile: {}", self.profile());
        println!("Known regions: {}", region_names().join(", "));
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .as_deref()
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;

    fn cli(argv: &[&str], mut config: Config) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    fn config_with_profiles() -> Config {
        let mut config = Config::default();
        config.connection.access_id = Some("top-id".to_string());
        config.connection.access_key = Some("top-key".to_string());
        config.connection.profiles.insert(
            "eu-team".to_string(),
            ProfileConfig {
                region: Some("eu".to_string()),
                access_id: Some("eu-id".to_string()),
                ..Default::default()
            },
        );
        config
    }

    #[test]
    fn test_command_is_required() {
        assert!(CliArgs::try_parse_from(["sumoql"]).is_err());
    }

    #[test]
    fn test_search_args() {
        let args = CliArgs::try_parse_from([
            "sumoql",
            "search",
            "_sourceCategory=prod | count by host",
            "--from",
            "2024-01-01T00:00:00",
            "--to",
            "2024-01-01T01:00:00",
            "--limit",
            "50",
        ])
        .unwrap();

        match args.command {
            Commands::Search {
                query, limit, time_zone, ..
            } => {
                assert_eq!(query, "_sourceCategory=prod | count by host");
                assert_eq!(limit, Some(50));
                assert_eq!(time_zone, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["sumoql", "suggest", "ho", "--profile", "prod", "-v"]).unwrap();
        assert_eq!(args.profile.as_deref(), Some("prod"));
        assert!(args.verbose);
    }

    #[test]
    fn test_logging_flags() {
        let c = cli(&["sumoql", "--vv", "sync"], Config::default());
        assert_eq!(c.config().logging.level, LogLevel::Trace);

        let c = cli(&["sumoql", "-q", "sync"], Config::default());
        assert_eq!(c.config().logging.level, LogLevel::Error);
    }

    #[test]
    fn test_no_color_and_timeout() {
        let c = cli(&["sumoql", "--no-color", "--timeout", "5", "sync"], Config::default());
        assert!(!c.config().display.color_output);
        assert_eq!(c.config().connection.timeout, 5);
    }

    #[test]
    fn test_profile_defaults() {
        let c = cli(&["sumoql", "sync"], Config::default());
        assert_eq!(c.profile(), "default");

        let c = cli(&["sumoql", "--profile", "eu-team", "sync"], Config::default());
        assert_eq!(c.profile(), "eu-team");
    }

    #[test]
    fn test_connection_uses_profile() {
        let c = cli(&["sumoql", "--profile", "eu-team", "sync"], config_with_profiles());
        let conn = c.connection().unwrap();

        assert_eq!(conn.profile, "eu-team");
        assert_eq!(conn.endpoint, "https://api.eu.sumologic.com/api/");
        assert_eq!(conn.access_id, "eu-id");
        assert_eq!(conn.access_key, "top-key");
    }

    #[test]
    fn test_flags_override_profile() {
        let c = cli(
            &[
                "sumoql",
                "--profile",
                "eu-team",
                "--region",
                "jp",
                "--access-id",
                "flag-id",
                "sync",
            ],
            config_with_profiles(),
        );
        let conn = c.connection().unwrap();

        assert_eq!(conn.endpoint, "https://api.jp.sumologic.com/api/");
        assert_eq!(conn.access_id, "flag-id");
    }

    #[test]
    fn test_missing_credentials() {
        let c = cli(&["sumoql", "sync"], Config::default());
        assert!(c.connection().is_err());

        let c = cli(
            &["sumoql", "--access-id", "i", "--access-key", "k", "sync"],
            Config::default(),
        );
        assert!(c.connection().is_ok());
    }

    #[test]
    fn test_bad_region_flag() {
        let c = cli(&["sumoql", "--region", "mars", "sync"], config_with_profiles());
        assert!(c.connection().is_err());
    }

    #[test]
    fn test_local_subcommands_handled() {
        let c = cli(&["sumoql", "version"], Config::default());
        assert!(c.handle_subcommand().unwrap());

        let c = cli(&["sumoql", "suggest"], Config::default());
        assert!(!c.handle_subcommand().unwrap());
    }
}
