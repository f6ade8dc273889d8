use anyhow::{bail, Context, Result};
use billed_api::HttpStore;
use billed_core::new_bill::{FormFields, FormSubmission};
use billed_core::{
    BillStore, Bills, BillsView, ExpenseType, FileSelection, NewBill, SelectedFile, Session,
    UserType,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "billed", version, about = "Submit and review expense reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the current user in ~/.billed/user.json
    Login {
        #[arg(long)]
        email: String,

        /// Log in as an administrator instead of an employee
        #[arg(long)]
        admin: bool,

        /// Bearer token for the API
        #[arg(long)]
        jwt: Option<String>,
    },

    /// Forget the current user
    Logout,

    /// Show the bills of the current user, latest first
    List,

    /// Upload a receipt and submit a new bill
    New(NewBillArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Args, Debug)]
struct NewBillArgs {
    /// Receipt image (jpg, jpeg or png)
    #[arg(long)]
    file: PathBuf,

    /// Expense type, e.g. "Transports" or "Restaurants et bars"
    #[arg(long = "type")]
    expense_type: String,

    #[arg(long)]
    name: String,

    /// Expense date (YYYY-MM-DD)
    #[arg(long)]
    date: String,

    /// Amount including VAT
    #[arg(long)]
    amount: String,

    /// VAT amount
    #[arg(long, default_value = "")]
    vat: String,

    /// VAT percent (default: 20)
    #[arg(long, default_value = "")]
    pct: String,

    #[arg(long, default_value = "")]
    commentary: String,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.billed/config.toml with defaults
    Init,

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Login { email, admin, jwt } => {
            let session = Session {
                user: billed_core::User {
                    email,
                    user_type: if admin { UserType::Admin } else { UserType::Employee },
                },
                jwt,
            };
            state::write_session(&session)?;
            println!("Logged in as {} ({:?})", session.email(), session.user.user_type);
        }

        Command::Logout => {
            state::clear_session()?;
            println!("Logged out");
        }

        Command::List => {
            let session = state::read_session()?;
            list_bills(open_store(&session)?).await?;
        }

        Command::New(args) => {
            let session = state::read_session()?;
            let store = open_store(&session)?;
            submit_new_bill(store, session, args).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn open_store(session: &Session) -> Result<Arc<dyn BillStore>> {
    let cfg = config::load_config()?;
    let store = HttpStore::new(&cfg.api.base_url, session.jwt.clone(), cfg.api.timeout())
        .with_context(|| format!("configure api client for {}", cfg.api.base_url))?;
    info!(base_url = %store.base_url(), "using billing api");
    Ok(Arc::new(store))
}

async fn list_bills(store: Arc<dyn BillStore>) -> Result<()> {
    let mut page = Bills::new(store, |_: &str| {});
    match page.load().await {
        BillsView::Loaded(bills) if bills.is_empty() => println!("No bills yet."),
        BillsView::Loaded(bills) => {
            for b in bills {
                let date = b.date.map(|d| d.to_string()).unwrap_or_else(|| "?".repeat(10));
                let amount = b.amount.map(|a| format!("{a:.2}")).unwrap_or_else(|| "-".to_string());
                println!(
                    "{} | {:<22} | {:<30} | {:>9} € | {}",
                    date,
                    b.expense_type.map_or("-", |t| t.label()),
                    b.name,
                    amount,
                    b.status.label()
                );
            }
        }
        BillsView::Error(message) => bail!("{message}"),
        BillsView::Loading => {}
    }
    Ok(())
}

async fn submit_new_bill(
    store: Arc<dyn BillStore>,
    session: Session,
    args: NewBillArgs,
) -> Result<()> {
    if ExpenseType::from_label(&args.expense_type).is_none() {
        let known: Vec<_> = ExpenseType::ALL.iter().map(|t| t.label()).collect();
        bail!("unknown expense type {:?} (one of: {})", args.expense_type, known.join(", "));
    }

    let content =
        std::fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no file name in {}", args.file.display()))?
        .to_string();

    let mut form = NewBill::new(
        store,
        session,
        |route: &str| println!("-> {route}"),
        |message: &str| eprintln!("{message}"),
    );

    match form.handle_file_selected(SelectedFile::new(file_name, content)).await {
        FileSelection::Uploaded(created) => {
            println!("Uploaded {} ({})", args.file.display(), created.file_url)
        }
        FileSelection::Rejected(e) => bail!("attachment rejected: {e}"),
        FileSelection::Failed(e) => bail!("upload failed: {e}"),
        FileSelection::Superseded => bail!("upload superseded"),
    }

    let mut event = FormSubmission::new(FormFields {
        expense_type: args.expense_type,
        name: args.name,
        date: args.date,
        amount: args.amount,
        vat: args.vat,
        pct: args.pct,
        commentary: args.commentary,
    });
    let saved = form.handle_submit(&mut event).await.context("submit bill")?;
    println!(
        "Submitted {} ({}): {}",
        saved.id.as_deref().unwrap_or("?"),
        saved.name,
        saved.status.label()
    );
    Ok(())
}
