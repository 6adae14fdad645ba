use chrono::{TimeDelta, Utc};
use monoapi::Client;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let token = env::var("MONOBANK_TOKEN")
        .map_err(|_| "Set MONOBANK_TOKEN in your environment or .env file")?;

    let client = Client::new(token)?;

    // Statements for the last 30 days of the default account.
    let to = Utc::now();
    let from = to - TimeDelta::days(30);

    let items = client.fetch_statements(from, to).await?;

    println!("Fetched {} statement items from {} to {}:", items.len(), from, to);
    for item in &items {
        println!(
            "{} | {:?} {:?}",
            item.id.as_deref().unwrap_or("-"),
            item.time_utc(),
            item.amount_decimal()
        );
    }

    Ok(())
}
