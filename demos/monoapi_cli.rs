use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use monoapi::{Client, DEFAULT_ACCOUNT, StatementItem, UserInfo};
use std::error::Error;

#[derive(Debug, Parser)]
#[command(name = "monoapi-cli", about = "CLI wrapper for the Monobank personal API")]
struct Cli {
    /// API token; falls back to MONOBANK_TOKEN env var
    #[arg(long, env = "MONOBANK_TOKEN")]
    token: String,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show client name, accounts and jars
    ClientInfo,
    /// Fetch statement items for a date range (local midnight to local midnight)
    Statements {
        /// Start date YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        /// End date YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
        /// Account id; "0" is the default account
        #[arg(long, default_value = DEFAULT_ACCOUNT)]
        account: String,
    },
    /// Register a webhook URL
    SetWebhook {
        #[arg(long)]
        url: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string())
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Utc>, Box<dyn Error>> {
    let local = Local
        .from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .earliest()
        .ok_or("date has no local midnight")?;
    Ok(local.with_timezone(&Utc))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut client = Client::new(cli.token)?;
    if let Some(base_url) = cli.base_url {
        client = client.with_base_url(base_url);
    }

    match cli.command {
        Commands::ClientInfo => {
            let info = client.fetch_client_info().await?;
            print_client_info(&info);
        }
        Commands::Statements { from, to, account } => {
            let items = client
                .fetch_account_statements(&account, local_midnight(from)?, local_midnight(to)?)
                .await?;
            print_statements(&items);
        }
        Commands::SetWebhook { url } => {
            client.try_set_webhook(&url).await?;
            println!("Registered webhook {}", url);
        }
    }

    Ok(())
}

fn print_client_info(info: &UserInfo) {
    println!(
        "{} ({})",
        info.name.as_deref().unwrap_or("-"),
        info.client_id.as_deref().unwrap_or("-")
    );
    for account in &info.accounts {
        println!(
            "  account {} | {} | balance {} | currency {}",
            account.id.as_deref().unwrap_or("-"),
            account.account_type.as_deref().unwrap_or("-"),
            account
                .balance_decimal()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".into()),
            account.currency_code.unwrap_or_default()
        );
    }
    for jar in &info.jars {
        println!(
            "  jar {} | {}",
            jar.id.as_deref().unwrap_or("-"),
            jar.title.as_deref().unwrap_or("-")
        );
    }
}

fn print_statements(items: &[StatementItem]) {
    println!("Fetched {} statement items:", items.len());
    for item in items {
        println!(
            "{} | {} | {}",
            item.time_utc()
                .map(|t| t.with_timezone(&Local).to_string())
                .unwrap_or_else(|| "-".into()),
            item.amount_decimal()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".into()),
            item.description.as_deref().unwrap_or("")
        );
    }
}
