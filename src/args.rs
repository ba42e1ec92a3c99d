//! These structs provide the CLI interface for the stamps CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// stamps: A calculator for adding up postage stamps.
///
/// Pick stamps from a catalog of denominations and see the running total, how much postage is
/// still missing against a target amount, and how close you are. If you are not sure what the
/// target should be, describe what you are mailing and an AI model will suggest one.
///
/// Suggestions use the Gemini API and need an API key, passed as --api-key or GEMINI_API_KEY.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the stamps home directory and write a default config.json.
    ///
    /// This is optional. Without a config file the built-in catalog and default suggestion
    /// settings are used. Create one when you want to change the catalog, the model, or the
    /// region and currency that suggestions are priced for.
    Init,
    /// List the stamp denominations that can be selected.
    Catalog,
    /// Add up a set of stamps and compare them with a target.
    Tally(TallyArgs),
    /// Ask the AI for a postage suggestion for a mailing need.
    Suggest(SuggestArgs),
    /// Run an interactive session that reads commands from standard input.
    Session,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the stamps config is held. Defaults to ~/.stamps
    #[arg(long, env = "STAMPS_HOME", default_value_t = default_stamps_home())]
    stamps_home: DisplayPath,

    /// The Gemini API key used for suggestions.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, stamps_home: PathBuf, api_key: Option<String>) -> Self {
        Self {
            log_level,
            stamps_home: stamps_home.into(),
            api_key,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn stamps_home(&self) -> &DisplayPath {
        &self.stamps_home
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// (Not shown): Args for the `stamps tally` command.
#[derive(Debug, Parser, Clone)]
pub struct TallyArgs {
    /// A stamp to add, as a denomination id with an optional count, e.g. `d4` or `d4:3`. May be
    /// repeated.
    #[arg(long = "stamp", short = 's')]
    stamps: Vec<StampSpec>,

    /// The target postage, e.g. `12.5`.
    #[arg(long, short = 't', allow_hyphen_values = true)]
    target: Option<String>,
}

impl TallyArgs {
    pub fn new(stamps: Vec<StampSpec>, target: Option<String>) -> Self {
        Self { stamps, target }
    }

    pub fn stamps(&self) -> &[StampSpec] {
        &self.stamps
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// (Not shown): Args for the `stamps suggest` command.
#[derive(Debug, Parser, Clone)]
pub struct SuggestArgs {
    /// What you want to mail, e.g. "a 50g letter to the UK".
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

impl SuggestArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: vec![query.into()],
        }
    }

    /// The query words joined with spaces.
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

/// A denomination id and how many of it, written `id` or `id:count`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StampSpec {
    id: String,
    count: u64,
}

impl StampSpec {
    pub fn new(id: impl Into<String>, count: u64) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl FromStr for StampSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, count) = match s.split_once(':') {
            Some((id, count)) => {
                let count = count
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid count in '{s}': {e}"))?;
                (id.trim(), count)
            }
            None => (s.trim(), 1),
        };
        if id.is_empty() {
            return Err(format!("Missing denomination id in '{s}'"));
        }
        if count == 0 {
            return Err(format!("The count in '{s}' must be at least 1"));
        }
        Ok(Self::new(id, count))
    }
}

fn default_stamps_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".stamps"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --stamps-home or STAMPS_HOME instead of relying on the default \
                stamps home directory.",
            );
            PathBuf::from(".stamps")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_spec() {
        assert_eq!("d4".parse::<StampSpec>().unwrap(), StampSpec::new("d4", 1));
        assert_eq!("d4:3".parse::<StampSpec>().unwrap(), StampSpec::new("d4", 3));
        assert_eq!(" d9 : 2 ".parse::<StampSpec>().unwrap(), StampSpec::new("d9", 2));
    }

    #[test]
    fn test_stamp_spec_errors() {
        assert!("d4:0".parse::<StampSpec>().is_err());
        assert!("d4:x".parse::<StampSpec>().is_err());
        assert!(":3".parse::<StampSpec>().is_err());
        assert!("".parse::<StampSpec>().is_err());
    }

    #[test]
    fn test_parse_tally_args() {
        let args = Args::try_parse_from([
            "stamps",
            "--stamps-home",
            "/tmp/x",
            "tally",
            "-s",
            "d4:3",
            "--stamp",
            "d1",
            "--target",
            "5",
        ])
        .unwrap();
        assert_eq!(args.common().stamps_home().path(), Path::new("/tmp/x"));
        let Command::Tally(tally) = args.command() else {
            panic!("expected tally");
        };
        assert_eq!(tally.stamps().len(), 2);
        assert_eq!(tally.target(), Some("5"));
    }

    #[test]
    fn test_parse_suggest_joins_words() {
        let args = Args::try_parse_from(["stamps", "suggest", "50g", "letter", "to", "UK"]).unwrap();
        let Command::Suggest(suggest) = args.command() else {
            panic!("expected suggest");
        };
        assert_eq!(suggest.query(), "50g letter to UK");
    }

    #[test]
    fn test_suggest_requires_query() {
        assert!(Args::try_parse_from(["stamps", "suggest"]).is_err());
    }
}
