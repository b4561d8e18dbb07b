use std::{path::PathBuf, process::ExitCode};

use api_types::event::EventNew;
use clap::{Args, Parser, Subcommand};
use mirror::{EventPatch, FileStorage, Mirror, backup_file_name};

use crate::{
    backend::Backend,
    client::Client,
    error::{AppError, Result},
};

mod backend;
mod client;
mod config;
mod error;
mod views;

#[derive(Parser, Debug)]
#[command(name = "whopaid")]
#[command(about = "Split shared expenses and track who paid")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Directory of the local store.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Work on the local store instead of the server.
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List events, newest first.
    List {
        /// Only the latest five.
        #[arg(long)]
        recent: bool,
    },
    /// Show an event with its settlement.
    Show { event_id: String },
    /// Create an event.
    New(NewArgs),
    /// Change name, total or participants of an event.
    Edit(EditArgs),
    Delete { event_id: String },
    /// Record a payment.
    Pay {
        event_id: String,
        participant_id: String,
        amount: i64,
    },
    /// Record whatever a participant still owes.
    QuickPay {
        event_id: String,
        participant_id: String,
    },
    /// Delete a payment.
    Unpay { payment_id: String },
    /// Write the local store as JSON.
    Export {
        /// Output file, defaults to `whopaid-backup-<date>.json`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the local store with a JSON export.
    Import { file: PathBuf },
    /// Delete every local event.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct NewArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    total: i64,
    /// Participant name, repeat for each person.
    #[arg(long = "participant", required = true)]
    participants: Vec<String>,
}

#[derive(Args, Debug)]
struct EditArgs {
    event_id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    total: Option<i64>,
    /// New roster, repeat for each person. Drops every payment.
    #[arg(long = "participant")]
    participants: Vec<String>,
    /// Allow dropping recorded payments.
    #[arg(long)]
    force: bool,
}

impl EditArgs {
    fn patch(&self) -> EventPatch {
        EventPatch {
            name: self.name.clone(),
            total_amount: self.total,
            participant_names: (!self.participants.is_empty()).then(|| self.participants.clone()),
        }
    }
}

async fn execute(backend: &mut Backend, command: Command) -> Result<String> {
    let out = match command {
        Command::List { recent } => views::render_list(&backend.events(recent).await?),
        Command::Show { event_id } => views::render_detail(&backend.event(&event_id).await?),
        Command::New(args) => {
            let event = backend
                .create_event(EventNew {
                    name: args.name,
                    total_amount: args.total,
                    participant_names: args.participants,
                })
                .await?;
            views::render_detail(&event)
        }
        Command::Edit(args) => {
            let patch = args.patch();
            if patch == EventPatch::default() {
                return Err(AppError::Usage(
                    "provide at least one of --name, --total or --participant".to_string(),
                ));
            }
            let event = backend.update_event(&args.event_id, patch, args.force).await?;
            views::render_detail(&event)
        }
        Command::Delete { event_id } => backend.delete_event(&event_id).await?,
        Command::Pay {
            event_id,
            participant_id,
            amount,
        } => views::render_payment(&backend.pay(&event_id, &participant_id, amount).await?),
        Command::QuickPay {
            event_id,
            participant_id,
        } => views::render_payment(&backend.quick_pay(&event_id, &participant_id).await?),
        Command::Unpay { payment_id } => backend.delete_payment(&payment_id).await?,
        Command::Export { output } => {
            let document = backend.local_mirror()?.export()?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(backup_file_name(chrono::Local::now().date_naive()))
            });
            std::fs::write(&path, document)?;
            format!("Exported to {}", path.display())
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let count = backend.local_mirror()?.import(&text)?;
            format!("Imported {count} events")
        }
        Command::Clear { yes } => {
            let mirror = backend.local_mirror()?;
            if !yes {
                return Err(AppError::Usage(
                    "this deletes every local event; rerun with --yes".to_string(),
                ));
            }
            mirror.clear()?;
            "Local data cleared".to_string()
        }
    };
    Ok(out)
}

async fn run(cli: Cli) -> Result<String> {
    let settings = config::load(config::Overrides {
        config: cli.config,
        base_url: cli.base_url,
        data_dir: cli.data_dir,
        local: cli.local,
    })?;

    let mut backend = if settings.local {
        Backend::Local(Mirror::new(FileStorage::new(&settings.data_dir)))
    } else {
        Backend::Remote(Client::new(&settings.base_url)?)
    };

    execute(&mut backend, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("whopaid_cli=warn,mirror=warn")
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(out) => {
            println!("{}", out.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
