//! SmallBank Client CLI
//!
//! A command-line tool for provisioning SmallBank accounts and driving a
//! transaction workload against a running service.

use clap::{Parser, Subcommand};
use smallbank_client::{ClientConfig, HttpTransport};
use smallbank_types::{ClientId, CreateAccountsPayload};
use smallbank_workload::{compute_range, Runner, SelectionPolicy, VerificationFixture};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smallbank-client")]
#[command(about = "SmallBank workload driver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the batch-creation payload for a client's accounts
    Provision {
        /// Number of accounts per client
        #[arg(long, default_value = "10")]
        accounts: u64,

        /// Index of this client instance
        #[arg(long, default_value = "0")]
        client_id: u64,

        /// Partition clients, so that each uses a disjoint set of accounts
        #[arg(long)]
        pc: bool,

        /// Starting checking balance
        #[arg(long, default_value = "1000")]
        checking_balance: i64,

        /// Starting savings balance
        #[arg(long, default_value = "1000")]
        savings_balance: i64,
    },

    /// Run the transaction workload against a service endpoint
    Run {
        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Service endpoint (e.g. http://127.0.0.1:8000)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Per-request timeout (e.g. "500ms", "10s")
        #[arg(long)]
        timeout: Option<humantime::Duration>,

        /// Number of accounts per client
        #[arg(long)]
        accounts: Option<u64>,

        /// Partition clients, so that each uses a disjoint set of accounts
        #[arg(long)]
        pc: bool,

        /// Index of this client instance
        #[arg(long)]
        client_id: Option<u64>,

        /// Number of transactions to submit
        #[arg(short, long)]
        transactions: Option<usize>,

        /// Random seed (drawn from entropy when unset)
        #[arg(long)]
        seed: Option<u64>,

        /// Transaction selection (uniform, fixed:<type>, sequence:<type>,<type>,...)
        #[arg(long)]
        selection: Option<String>,

        /// Verify state against this JSON file at the Initial and Final checkpoints
        #[arg(long)]
        verify: Option<PathBuf>,

        /// Print every account balance after creation and after the run
        #[arg(long)]
        print_accounts: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Provision {
            accounts,
            client_id,
            pc,
            checking_balance,
            savings_balance,
        } => {
            // No tracing here; the payload goes to stdout
            let range = compute_range(accounts, ClientId(client_id), pc)?;
            let payload = CreateAccountsPayload::new(range, checking_balance, savings_balance);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Commands::Run {
            config,
            endpoint,
            timeout,
            accounts,
            pc,
            client_id,
            transactions,
            seed,
            selection,
            verify,
            print_accounts,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .init();

            let mut config = match config {
                Some(path) => ClientConfig::load(path)?,
                None => ClientConfig::default(),
            };

            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            if let Some(timeout) = timeout {
                config.timeout = *timeout;
            }
            if verify.is_some() {
                config.verify = verify;
            }

            let workload = &mut config.workload;
            if let Some(accounts) = accounts {
                workload.total_accounts = accounts;
            }
            if pc {
                workload.partition_clients = true;
            }
            if let Some(client_id) = client_id {
                workload.client_id = ClientId(client_id);
            }
            if let Some(transactions) = transactions {
                workload.num_transactions = transactions;
            }
            if let Some(seed) = seed {
                workload.seed = Some(seed);
            }
            if let Some(selection) = selection {
                workload.selection = selection.parse::<SelectionPolicy>()?;
            }
            if print_accounts {
                workload.print_accounts = true;
            }

            let transport = HttpTransport::new(&config.endpoint, config.timeout)?;
            info!(endpoint = %transport.endpoint(), timeout = ?config.timeout, "Connecting");

            let mut runner = Runner::new(config.workload, transport)?;
            if let Some(path) = &config.verify {
                info!(path = %path.display(), "Loading verification file");
                runner = runner.with_fixture(VerificationFixture::load(path)?)?;
            }

            let report = runner.run()?;
            report.print();
        }
    }

    Ok(())
}
