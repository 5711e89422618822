use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgGroup, ArgMatches, Command, ValueEnum, builder::EnumValueParser, value_parser};
use env_logger::{Builder, Env};
use serde::{Deserialize, Serialize};

use crate::inference::query::DEFAULT_PRECISION;
use crate::model::definition::NetworkDefinition;
use crate::model::network::BayesianNetwork;
use crate::scenarios::ScenarioFactory;

/// How answers are written.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize, ValueEnum)]
pub enum OutputFormat {
    /// `0.28417,7,16` and `yes`/`no`, one per line
    #[serde(rename = "plain")]
    Plain,

    /// One JSON object per line
    #[serde(rename = "json")]
    Json,
}

/// These options define the inputs from the user.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub network_file: Option<String>,
    pub scenario_name: Option<String>,
    pub queries_file: Option<String>,
    pub output_file: Option<String>,
    pub precision: usize,
    pub format: OutputFormat,
}

/// Where the network comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkSource {
    File(PathBuf),
    Scenario(String),
}

impl NetworkSource {
    pub fn load(&self) -> anyhow::Result<BayesianNetwork> {
        match self {
            NetworkSource::File(path) => {
                let definition = NetworkDefinition::from_file(path)?;
                definition
                    .build()
                    .with_context(|| format!("invalid network in {}", path.display()))
            }
            NetworkSource::Scenario(name) => {
                ScenarioFactory::build(name).with_context(|| format!("failed to build scenario '{}'", name))
            }
        }
    }
}

impl CommandLineOptions {
    pub fn network_source(&self) -> anyhow::Result<NetworkSource> {
        match (&self.network_file, &self.scenario_name) {
            (Some(path), None) => Ok(NetworkSource::File(PathBuf::from(path))),
            (None, Some(name)) => Ok(NetworkSource::Scenario(name.clone())),
            (Some(_), Some(_)) => Err(anyhow!("give either a network file or a scenario, not both")),
            (None, None) => Err(anyhow!("a network file or a scenario name is required")),
        }
    }
}

pub fn command() -> Command {
    Command::new("BAYESNET")
        .version("0.1")
        .about("Exact inference and d-separation over discrete Bayesian networks.")
        .arg(
            Arg::new("network")
                .long("network")
                .value_name("FILE")
                .help("Network definition to load (.xml/.xmlbif as XMLBIF, otherwise JSON)"),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .value_name("NAME")
                .help("Built-in network: chain, alarm or sprinkler"),
        )
        .group(
            ArgGroup::new("source")
                .args(["network", "scenario"])
                .required(true),
        )
        .arg(
            Arg::new("queries")
                .long("queries")
                .value_name("FILE")
                .help("File with one query per line (defaults to stdin)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("Where to write answers (defaults to stdout)"),
        )
        .arg(
            Arg::new("precision")
                .long("precision")
                .value_name("DIGITS")
                .value_parser(value_parser!(usize))
                .help("Decimal places for probabilities")
                .default_value("5"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(EnumValueParser::<OutputFormat>::new())
                .help("Answer format: 'plain' or 'json'")
                .default_value("plain"),
        )
}

pub fn options_from_args<I, T>(args: I) -> anyhow::Result<CommandLineOptions>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(options_from_matches(&matches))
}

/// Read the options defined by [`command`] out of parsed matches. Binaries
/// that extend the command with their own arguments use this directly.
pub fn options_from_matches(matches: &ArgMatches) -> CommandLineOptions {
    let owned = |name: &str| matches.get_one::<String>(name).cloned();

    CommandLineOptions {
        network_file: owned("network"),
        scenario_name: owned("scenario"),
        queries_file: owned("queries"),
        output_file: owned("output"),
        precision: matches
            .get_one::<usize>("precision")
            .copied()
            .unwrap_or(DEFAULT_PRECISION),
        format: matches
            .get_one::<OutputFormat>("format")
            .copied()
            .unwrap_or(OutputFormat::Plain),
    }
}

/// Route `log` output to stderr as `LEVEL [file:line] message`, `info` unless
/// `RUST_LOG` says otherwise.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .init();
}

pub fn parse_configuration_options() -> anyhow::Result<CommandLineOptions> {
    init_logging();
    options_from_args(std::env::args_os())
}
