use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod constants;
mod context;
mod db;
mod error;
mod query;
mod record;

use context::AppContext;
use record::{CountOutput, DeleteOutput, InsertOutput, LinkFields, LinkRecord, UpdateOutput};

const EXAMPLES: &str = "\
Examples:
  blitlink links.db
  blitlink links.db insert \"Hello World\" \"http://google.com\" \"Google\" \"g\"
  blitlink links.db insert \"Hello World\" \"http://google.com\" \"\" \"g\"
  blitlink links.db query \"Hello\"
  blitlink links.db update 1 \"Hello World\" \"http://github.com\" \"GitHub\" \"g\"
  blitlink links.db delete 1

The store file is created if it does not exist. All link fields are
required; empty strings are permitted.";

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    arg_required_else_help = true,
    after_help = EXAMPLES
)]
struct Cli {
    /// Store file (created if it does not exist)
    store: PathBuf,

    /// Config file layered over the global config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    /// Log store operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, PartialEq)]
struct FieldArgs {
    /// Free-form description
    #[arg(allow_hyphen_values = true)]
    text: String,
    /// URL or other reference
    #[arg(allow_hyphen_values = true)]
    link: String,
    /// Display title
    #[arg(allow_hyphen_values = true)]
    title: String,
    /// Short alias, matched first when querying
    #[arg(allow_hyphen_values = true)]
    shortcut: String,
}

impl From<FieldArgs> for LinkFields {
    fn from(args: FieldArgs) -> Self {
        Self {
            text: args.text,
            link: args.link,
            title: args.title,
            shortcut: args.shortcut,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print the number of stored links (default)
    Count,
    /// Add a link
    Insert {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Full-text search across all fields; exact shortcut matches come first
    Query {
        /// Search term, matched as a prefix
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Overwrite all fields of a link
    Update {
        /// Id of the link to overwrite
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Remove a link
    Delete {
        /// Id of the link to remove
        id: i64,
    },
    /// Print a single link
    Get {
        /// Id of the link to print
        id: i64,
    },
}

fn emit<T: Serialize + ?Sized>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    let json = record::render(value, pretty)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn execute(
    context: &mut AppContext,
    command: Commands,
    pretty: bool,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Count => {
            let count = context.store.count()?;
            emit(out, &CountOutput { count }, pretty)
        }
        Commands::Insert { fields } => {
            let record = context.store.insert(&fields.into())?;
            emit(out, &InsertOutput { inserted: &record }, pretty)
        }
        Commands::Query { text } => {
            let results = context.store.search(&text)?;
            emit(out, &results, pretty)
        }
        Commands::Update { id, fields } => {
            let fields = LinkFields::from(fields);
            let changed = context.store.update(id, &fields)? > 0;
            if !changed {
                warn!("No link with id {}, nothing updated", id);
            }
            let record = LinkRecord::new(id, fields);
            emit(
                out,
                &UpdateOutput {
                    updated: &record,
                    changed,
                },
                pretty,
            )
        }
        Commands::Delete { id } => {
            let changed = context.store.delete(id)? > 0;
            if !changed {
                warn!("No link with id {}, nothing deleted", id);
            }
            emit(
                out,
                &DeleteOutput {
                    deleted: id,
                    changed,
                },
                pretty,
            )
        }
        Commands::Get { id } => {
            let record = context.store.get(id)?;
            emit(out, &record, pretty)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut context = AppContext::new(&cli.store, cli.config.as_deref())?;
    let pretty = cli.pretty || context.pretty();
    let command = cli.command.unwrap_or(Commands::Count);

    let result = execute(&mut context, command, pretty, &mut io::stdout().lock());
    // Release the store on every path; the command's own error wins.
    let closed = context.close();
    result?;
    closed
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "blitlink=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(error::exit_code(&err))
        }
    }
}
