//! Command-line argument parsing for the `paramstore` binary.

use std::time::Duration;

use crate::error::ConfigurationError;
use crate::paramstore::config::parse_u64;
use crate::paramstore::ParamStoreConfig;

/// Usage text printed by `--help` and on argument errors.
pub const USAGE: &str = "\
Usage: paramstore [OPTIONS]

Reads every parameter under a path and prints it as nested JSON.
Requests are signed with AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
(and AWS_SESSION_TOKEN) from the environment.

Options:
  --path <PATH>         Parameter path to read (env: PARAMSTORE_PATH)
  --delimiter <DELIM>   Key separator used for nesting (default: /)
  --decrypt             Decrypt secure values
  --recursive           Include parameters in nested paths
  --interval <SECS>     Watch poll interval in seconds (default: 600)
  --endpoint <URL>      Store endpoint (emulator or signing proxy)
  --region <REGION>     Region used to derive the endpoint (env: AWS_REGION)
  --role-arn <ARN>      Assume this role before reading (env: PARAMSTORE_ROLE_ARN)
  --strip-prefix        Drop the path prefix from every key
  --flat                Print delimiter-joined keys instead of nested JSON
  --watch               Keep polling and print change events as JSON lines
  -V, --version         Print version
  -h, --help            Print this help
";

/// Options for a read (and optional watch) run.
///
/// `None`/`false` means "not given": the environment value stays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub path: Option<String>,
    pub delimiter: Option<String>,
    pub decrypt: bool,
    pub recursive: bool,
    pub interval: Option<Duration>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub role_arn: Option<String>,
    pub strip_prefix: bool,
    pub flat: bool,
    pub watch: bool,
}

impl CliOptions {
    /// Layer these options over `config`.
    pub fn apply(&self, mut config: ParamStoreConfig) -> ParamStoreConfig {
        if let Some(ref path) = self.path {
            config.path = path.clone();
        }
        if let Some(ref delimiter) = self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if self.decrypt {
            config.with_decryption = true;
        }
        if self.recursive {
            config.recursive = true;
        }
        if let Some(interval) = self.interval {
            config.watch_interval = interval;
        }
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(ref region) = self.region {
            config.region = Some(region.clone());
        }
        if let Some(ref role_arn) = self.role_arn {
            config.role_arn = Some(role_arn.clone());
        }
        config.normalized()
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Read (and maybe watch) parameters
    Run(CliOptions),
}

/// Parse command-line arguments; the first item is the program name.
///
/// `--version` and `--help` win over everything else on the line.
///
/// # Examples
///
/// ```
/// use paramstore::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["paramstore".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ConfigurationError>
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--path" => options.path = Some(value_for(&arg, args.next())?),
            "--delimiter" => options.delimiter = Some(value_for(&arg, args.next())?),
            "--endpoint" => options.endpoint = Some(value_for(&arg, args.next())?),
            "--region" => options.region = Some(value_for(&arg, args.next())?),
            "--role-arn" => options.role_arn = Some(value_for(&arg, args.next())?),
            "--interval" => {
                let raw = value_for(&arg, args.next())?;
                options.interval = Some(Duration::from_secs(parse_u64("--interval", &raw)?));
            }
            "--decrypt" => options.decrypt = true,
            "--recursive" => options.recursive = true,
            "--strip-prefix" => options.strip_prefix = true,
            "--flat" => options.flat = true,
            "--watch" => options.watch = true,
            _ => {
                return Err(ConfigurationError::InvalidValue {
                    key: "argument".to_string(),
                    value: arg.clone(),
                })
            }
        }
    }

    Ok(CliCommand::Run(options))
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, ConfigurationError> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(v),
        other => Err(ConfigurationError::InvalidValue {
            key: flag.to_string(),
            value: other.unwrap_or_default(),
        }),
    }
}
