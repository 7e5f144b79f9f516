/// Version injected at compile time via PSPROV_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("PSPROV_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paperspace_provider::config::{Config, ProviderConfig};
use paperspace_provider::schema::{Schema, Timeouts};
use paperspace_provider::{DataSourceKind, Operation, Provider, ResourceData, ResourceKind};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Manage Paperspace resources
#[derive(Parser, Debug)]
#[command(name = "psprov", version = VERSION, about, long_about = None)]
struct Args {
    /// Paperspace API key
    #[arg(long, global = true, env = "PAPERSPACE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API host
    #[arg(long, global = true, env = "PAPERSPACE_API_HOST")]
    api_host: Option<String>,

    /// Default region, e.g. "East Coast (NY2)"
    #[arg(long, global = true, env = "PAPERSPACE_REGION")]
    region: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a lifecycle operation on a managed resource
    Resource {
        /// Resource type, e.g. paperspace_machine or machine
        #[arg(value_name = "TYPE")]
        kind: String,

        #[arg(value_enum)]
        operation: OperationArg,

        /// Remote id (required for read, update and delete)
        #[arg(long)]
        id: Option<String>,

        /// Override every operation deadline, in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        #[command(flatten)]
        input: Input,
    },

    /// Look up a data source
    Data {
        #[arg(value_name = "TYPE")]
        kind: String,

        #[command(flatten)]
        input: Input,
    },

    /// Print the attribute table of a type
    Schema {
        #[arg(value_name = "TYPE")]
        kind: String,
    },

    /// Inspect or change the persistent configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the stored configuration
    Show,
    /// Store the default region
    SetRegion { region: String },
    /// Store the API host
    SetHost { host: String },
}

/// Attribute input shared by resource and data commands
#[derive(clap::Args, Debug)]
struct Input {
    /// YAML or JSON file with attributes, or a previous `psprov` output
    #[arg(long, value_name = "FILE")]
    attrs: Option<PathBuf>,

    /// Set one attribute
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OperationArg {
    Create,
    Read,
    Update,
    Delete,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Create => Operation::Create,
            OperationArg::Read => Operation::Read,
            OperationArg::Update => Operation::Update,
            OperationArg::Delete => Operation::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

const LOG_ENV: &str = "PSPROV_LOG";

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // PSPROV_LOG takes env-filter directives and wins over --log-level
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {} directives", LOG_ENV))?,
        _ => match level.to_tracing_level() {
            Some(tracing_level) => EnvFilter::new(tracing_level.to_string()),
            None => return Ok(None),
        },
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("psprov {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("psprov").join("psprov.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".psprov").join("psprov.log");
    }
    PathBuf::from("psprov.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {err:#}");
        // flush the log file before exiting
        drop(log_guard);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Resource {
            kind,
            operation,
            id,
            timeout,
            input,
        } => {
            let kind = ResourceKind::parse(kind).ok_or_else(|| unknown_type(kind, "resource"))?;
            let operation = Operation::from(*operation);
            let provider = build_provider(args)?;

            let mut data = load_data(kind.schema(), input, matches!(operation, Operation::Create))?;
            if let Some(id) = id {
                data.set_id(id.clone());
            }
            if let Some(secs) = timeout {
                data.set_timeouts(Timeouts::all(Duration::from_secs(*secs)));
            }

            kind.apply(operation, &provider, &mut data)
                .await
                .with_context(|| format!("{} {}", operation.as_str(), kind))?;
            print_json(&data.to_json())
        }
        Command::Data { kind, input } => {
            let kind = DataSourceKind::parse(kind)
                .ok_or_else(|| unknown_type(kind, "data source"))?;
            let provider = build_provider(args)?;

            let mut data = load_data(kind.schema(), input, true)?;
            kind.read(&provider, &mut data)
                .await
                .with_context(|| format!("read data source {}", kind))?;
            print_json(&data.to_json())
        }
        Command::Schema { kind } => {
            let schema = ResourceKind::parse(kind)
                .map(ResourceKind::schema)
                .or_else(|| DataSourceKind::parse(kind).map(DataSourceKind::schema))
                .ok_or_else(|| unknown_type(kind, "resource or data source"))?;
            print_schema(schema);
            Ok(())
        }
        Command::Config(command) => run_config(command),
    }
}

fn build_provider(args: &Args) -> Result<Provider> {
    let config = ProviderConfig::resolve(
        args.api_key.clone(),
        args.api_host.clone(),
        args.region.clone(),
        &Config::load(),
    )?;
    Ok(Provider::new(&config)?)
}

fn unknown_type(name: &str, what: &str) -> anyhow::Error {
    anyhow!("unknown {} type: {}", what, name)
}

/// Build the attribute set from `--attrs` and `--set`.
///
/// With `declared_only`, input is what an operator writes: computed
/// attributes are rejected. Otherwise the file may be a previous output
/// (`{"id": ..., "attributes": {...}}`) carrying the full state.
fn load_data(schema: &'static Schema, input: &Input, declared_only: bool) -> Result<ResourceData> {
    let (id, mut attributes) = match &input.attrs {
        Some(path) => read_attrs_file(path)?,
        None => (None, Map::new()),
    };

    for pair in &input.set {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("--set expects KEY=VALUE, got \"{}\"", pair))?;
        let attr = schema
            .attribute(key)
            .ok_or_else(|| anyhow!("{}: unsupported attribute \"{}\"", schema.type_name, key))?;
        let value = attr
            .ty
            .parse(raw)
            .ok_or_else(|| anyhow!("{}: \"{}\" is not a valid {}", key, raw, attr.ty.as_str()))?;
        attributes.insert(key.to_string(), value);
    }

    let mut data = if declared_only {
        ResourceData::from_config(schema, &attributes)?
    } else {
        let mut data = ResourceData::new(schema);
        for (key, value) in attributes {
            data.set(&key, value)?;
        }
        data
    };

    if let Some(id) = id {
        data.set_id(id);
    }
    Ok(data)
}

fn read_attrs_file(path: &Path) -> Result<(Option<String>, Map<String, Value>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let Value::Object(mut object) = value else {
        bail!("{} must contain a mapping of attributes", path.display());
    };

    // output of a previous run
    if let Some(Value::Object(attributes)) = object.remove("attributes") {
        let id = object.get("id").and_then(Value::as_str).map(str::to_string);
        return Ok((id, attributes));
    }
    Ok((None, object))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_schema(schema: &Schema) {
    println!("{}", schema.type_name);
    for attr in schema.attributes {
        println!("  {:<28} {:<7} {}", attr.name, attr.ty.as_str(), attr.mode.as_str());
    }
    let timeouts = schema.timeouts;
    println!(
        "  timeouts: create {}s, update {}s, delete {}s",
        timeouts.create.as_secs(),
        timeouts.update.as_secs(),
        timeouts.delete.as_secs()
    );
}

fn run_config(command: &ConfigCommand) -> Result<()> {
    let mut config = Config::load();
    match command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            if shown.api_key.is_some() {
                shown.api_key = Some("<redacted>".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
            if let Some(path) = Config::config_path() {
                println!("# {}", path.display());
            }
        }
        ConfigCommand::SetRegion { region } => {
            config.set_region(region)?;
            println!("Default region set to {}", region);
        }
        ConfigCommand::SetHost { host } => {
            ProviderConfig::resolve(
                Some("-".to_string()),
                Some(host.clone()),
                None,
                &Config::default(),
            )
            .context("refusing to store API host")?;
            config.set_api_host(host)?;
            println!("API host set to {}", host);
        }
    }
    Ok(())
}
