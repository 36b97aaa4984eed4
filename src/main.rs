//! Purpose: `loadstone` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All resolution goes through `api::AddonLoader`.
#![allow(clippy::result_large_err)]

use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use loadstone::api::{
    AddonLoader, Error, ErrorKind, HostPlatform, ResolvedArtifact, format_pointer, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "loadstone",
    version,
    about = "Resolve and load compiled native addons relative to a package root",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ResolveArgs {
    #[arg(
        long,
        help = "Absolute path of the module performing the resolution",
        value_hint = ValueHint::FilePath
    )]
    module: PathBuf,
    #[arg(
        long,
        default_value = "build",
        help = "Build output folder, relative to the package root"
    )]
    build_folder: PathBuf,
    #[arg(long, help = "Directories inspected while searching for package.json")]
    max_hops: Option<usize>,
    #[arg(long, help = "Recognized addon file suffix (default: .node)")]
    suffix: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Resolve the addon artifact without loading it")]
    Resolve(ResolveArgs),
    #[command(about = "Resolve the addon artifact and load it")]
    Load(ResolveArgs),
    #[command(about = "Format a pointer value as fixed-width hex")]
    Pointer {
        #[arg(
            help = "Pointer value, decimal or 0x-prefixed hex",
            allow_hyphen_values = true
        )]
        value: String,
    },
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                let _ = err.print();
                return Ok(RunOutcome::ok());
            }
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = err.print();
                return Ok(RunOutcome::with_code(2));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage).with_message(err.to_string()));
            }
        },
    };

    match cli.command {
        Command::Resolve(args) => {
            let resolved = loader_for(&args).resolve(&args.build_folder)?;
            emit_resolved(&resolved);
            Ok(RunOutcome::ok())
        }
        Command::Load(args) => {
            let addon = loader_for(&args).load_relative_to_package_root(&args.build_folder)?;
            println!("{}", render(&json!({ "path": addon.path(), "loaded": true })));
            Ok(RunOutcome::ok())
        }
        Command::Pointer { value } => {
            let parsed = parse_pointer_value(&value)?;
            println!("{}", format_pointer(parsed)?);
            Ok(RunOutcome::ok())
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn loader_for(args: &ResolveArgs) -> AddonLoader<HostPlatform> {
    let mut loader = AddonLoader::new(HostPlatform::new(), &args.module);
    if let Some(max_hops) = args.max_hops {
        loader = loader.with_max_hops(max_hops);
    }
    if let Some(suffix) = &args.suffix {
        loader = loader.with_artifact_suffix(suffix);
    }
    loader
}

fn parse_pointer_value(input: &str) -> Result<i128, Error> {
    let trimmed = input.trim();
    let (digits, radix) = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };
    i128::from_str_radix(digits, radix).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("could not parse pointer value \"{trimmed}\""))
            .with_source(err)
    })
}

fn emit_resolved(resolved: &ResolvedArtifact) {
    println!("{}", render(&resolved_json(resolved)));
}

fn resolved_json(resolved: &ResolvedArtifact) -> Value {
    json!({
        "package_root": resolved.package_root,
        "variant": resolved.variant,
        "file_name": resolved.file_name,
        "path": resolved.path,
    })
}

fn render(value: &Value) -> String {
    if io::stdout().is_terminal() {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|_| "{}".to_string())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {}", error_text(err));
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_text(err: &Error) -> String {
    let mut text = err.message().unwrap_or("unexpected failure").to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    text
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(cause) = err.cause() {
        inner.insert("cause".to_string(), error_json(cause));
    } else if let Some(source) = err.source() {
        inner.insert("cause".to_string(), json!(source.to_string()));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
