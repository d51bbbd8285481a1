//! draftcheck - terminal front end
//!
//! `analyze` prints the aggregated analysis report for a draft; `send` mails it.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use draftcheck::config::{ConfigStore, SettingsResolver, CONFIG_FILE, SECRET_NAMES};
use draftcheck::domain::DraftEmail;
use draftcheck::services::{AnalysisReport, OutgoingEmail, DEFAULT_SENDER};
use draftcheck::storage::KeychainAccess;

#[derive(Debug, Parser)]
#[command(name = "draftcheck", version, about = "Check an email draft, then send it")]
struct Cli {
    /// Path of the saved email defaults
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run sentiment, formality, and moderation checks and print the report
    Analyze {
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Send the draft over SMTP
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Sender address (defaults to the last one used)
        #[arg(long)]
        from: Option<String>,
        #[arg(long, default_value = "")]
        subject: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Manage service secrets in the OS keychain
    Keychain {
        #[command(subcommand)]
        action: KeychainAction,
    },
}

#[derive(Debug, clap::Args)]
struct DraftArgs {
    /// Read the body from this file instead of stdin
    #[arg(long)]
    body_file: Option<PathBuf>,
    /// File to attach; images are also checked by moderation
    #[arg(long)]
    attachment: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum KeychainAction {
    /// Store a secret read from stdin
    Set { name: String },
    /// Remove a stored secret
    Delete { name: String },
}

impl DraftArgs {
    fn load(&self) -> Result<DraftEmail> {
        let body = match &self.body_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut body = String::new();
                std::io::stdin()
                    .read_to_string(&mut body)
                    .context("Failed to read draft from stdin")?;
                body
            }
        };

        let mut draft = DraftEmail::new(body);
        if let Some(path) = &self.attachment {
            draft = draft.with_attachment(path);
        }
        Ok(draft)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let keychain = KeychainAccess::new();

    match cli.command {
        Command::Analyze { draft } => {
            let draft = draft.load()?;
            let report = if draft.has_analyzable_content() {
                let settings = SettingsResolver::from_env(&keychain).analysis().await?;
                draftcheck::analysis_service(&settings)
                    .analyze_draft(&draft)
                    .await
            } else {
                AnalysisReport::empty()
            };
            println!("{}", report);
        }
        Command::Send {
            to,
            from,
            subject,
            draft,
        } => {
            let draft = draft.load()?;
            send(&cli.config, &keychain, to, from, subject, draft).await?;
        }
        Command::Keychain { action } => match action {
            KeychainAction::Set { name } => {
                check_secret_name(&name)?;
                let mut value = String::new();
                std::io::stdin()
                    .read_line(&mut value)
                    .context("Failed to read secret from stdin")?;
                let value = value.trim();
                if value.is_empty() {
                    bail!("No value given for {}", name);
                }
                keychain.store(&name, value).await?;
                tracing::info!(name = %name, "Stored secret");
            }
            KeychainAction::Delete { name } => {
                check_secret_name(&name)?;
                keychain.delete(&name).await?;
                tracing::info!(name = %name, "Deleted secret");
            }
        },
    }

    Ok(())
}

async fn send(
    config_path: &Path,
    keychain: &KeychainAccess,
    to: String,
    from: Option<String>,
    subject: String,
    draft: DraftEmail,
) -> Result<()> {
    let store = ConfigStore::new(config_path);
    let mut config = store.load()?;

    let sender = from
        .or_else(|| config.sender.clone())
        .unwrap_or_else(|| DEFAULT_SENDER.to_string());

    let mut email = OutgoingEmail::new(sender, to, subject, draft.trimmed_body());
    email.attachment_path = draft.attachment_path;

    let settings = SettingsResolver::from_env(keychain).smtp().await?;
    let result = draftcheck::mail_service(settings).send_email(&email).await;

    if !result.is_sent() {
        bail!("{}", result);
    }
    println!("{}", result);

    config.remember_send(&email.sender, &email.recipient, &email.subject);
    store.save(&config)?;
    Ok(())
}

fn check_secret_name(name: &str) -> Result<()> {
    if !SECRET_NAMES.contains(&name) {
        bail!(
            "Unknown secret {}; expected one of {}",
            name,
            SECRET_NAMES.join(", ")
        );
    }
    Ok(())
}
