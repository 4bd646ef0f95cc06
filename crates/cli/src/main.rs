//! LoanGuard CLI - Main entry point

use clap::{Parser, Subcommand};
use loanguard_cli::{commands, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loanguard")]
#[command(about = "LoanGuard - loan verification integrity tooling", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Fill classifier/OCR/forensics/sentiment slots with mock services
    #[arg(long)]
    mock_services: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an event from a JSON file to a loan's ledger
    Append {
        /// Loan ID
        loan: String,
        /// Path to the event JSON file
        event: PathBuf,
        /// Actor recorded on the entry
        #[arg(long, default_value = "cli")]
        performed_by: String,
        /// Monetary amount tied to the event
        #[arg(long)]
        amount: Option<Decimal>,
        /// Origin IP to record
        #[arg(long)]
        ip: Option<String>,
    },

    /// Print a loan's ledger in sequence order
    History {
        /// Loan ID
        loan: String,
    },

    /// Verify one loan's hash chain
    Verify {
        /// Loan ID
        loan: String,
    },

    /// Verify every loan in the store
    VerifyAll,

    /// Verification summary plus activity metadata for a loan
    Status {
        /// Loan ID
        loan: String,
    },

    /// Evaluate a submission and record the outcome on the ledger
    Evaluate {
        /// Path to the submission JSON file
        submission: PathBuf,
        /// Path to the loan JSON file
        loan: PathBuf,
        /// Path to the rule set JSON file
        ruleset: PathBuf,
    },

    /// Record an officer review and check it for conflicts
    Review {
        /// Path to the submission JSON file
        submission: PathBuf,
        /// Path to the loan JSON file
        loan: PathBuf,
        /// Path to the rule set JSON file
        ruleset: PathBuf,
        /// Officer decision: APPROVED, REJECTED or ASK_RESUBMISSION
        #[arg(long)]
        decision: String,
        /// Officer remarks
        #[arg(long, default_value = "")]
        remarks: String,
        /// Officer ID
        #[arg(long, default_value = "officer")]
        officer: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli.data, cli.mock_services)?;

    match cli.command {
        Commands::Append {
            loan,
            event,
            performed_by,
            amount,
            ip,
        } => {
            commands::append(&ctx, &loan, &event, &performed_by, amount, ip)?;
        }

        Commands::History { loan } => {
            commands::history(&ctx, &loan)?;
        }

        Commands::Verify { loan } => {
            commands::verify(&ctx, &loan)?;
        }

        Commands::VerifyAll => {
            commands::verify_all(&ctx)?;
        }

        Commands::Status { loan } => {
            commands::status(&ctx, &loan)?;
        }

        Commands::Evaluate {
            submission,
            loan,
            ruleset,
        } => {
            commands::evaluate(&ctx, &submission, &loan, &ruleset).await?;
        }

        Commands::Review {
            submission,
            loan,
            ruleset,
            decision,
            remarks,
            officer,
        } => {
            commands::review(
                &ctx, &submission, &loan, &ruleset, &decision, &remarks, &officer,
            )
            .await?;
        }
    }

    Ok(())
}
