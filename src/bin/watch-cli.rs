use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "watch-cli")]
#[command(about = "Command-line client for the wallet-watch API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "WATCH_API_URL", default_value = "http://127.0.0.1:8081")]
    url: String,

    #[arg(short, long, env = "WATCH_API_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service version and tracked wallet count
    Status,
    /// Show balance and recent transactions of an address
    Lookup {
        address: String,
        /// TON, ETH or BSC; required for EVM addresses
        #[arg(short, long)]
        chain: Option<String>,
    },
    /// List wallets tracked by a chat
    List { chat_id: i64 },
    /// Start notifying a chat about a wallet
    Track {
        chat_id: i64,
        address: String,
        #[arg(short, long)]
        chain: Option<String>,
    },
    /// Stop notifying a chat about a wallet
    Untrack { chat_id: i64, address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let client = reqwest::Client::builder().default_headers(headers).build()?;

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/status")).send().await?,
        Commands::Lookup { address, chain } => {
            let mut request = client.get(format!("{base}/lookup/{address}"));
            if let Some(chain) = chain {
                request = request.query(&[("chain", chain)]);
            }
            let res = request.send().await?;
            // Lookups carry a pre-rendered message; show it as-is.
            if res.status().is_success() {
                let body: Value = res.json().await?;
                match body.get("text").and_then(Value::as_str) {
                    Some(text) => println!("{text}"),
                    None => println!("{}", serde_json::to_string_pretty(&body)?),
                }
                return Ok(());
            }
            res
        }
        Commands::List { chat_id } => {
            client
                .get(format!("{base}/chats/{chat_id}/wallets"))
                .send()
                .await?
        }
        Commands::Track {
            chat_id,
            address,
            chain,
        } => {
            client
                .post(format!("{base}/chats/{chat_id}/wallets"))
                .json(&json!({ "address": address, "chain": chain }))
                .send()
                .await?
        }
        Commands::Untrack { chat_id, address } => {
            client
                .delete(format!("{base}/chats/{chat_id}/wallets/{address}"))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {status}");
        if let Ok(text) = res.text().await {
            eprintln!("Response: {text}");
        }
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{status}");
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
