use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "rot13-cli")]
#[command(about = "Command line client for the ROT13 API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service information
    Info,
    /// Check service health
    Health,
    /// Log in and print an access token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Encode uppercase text with ROT13
    Encode {
        #[arg(short, long)]
        token: String,
        text: String,
    },
    /// Show the user a token belongs to
    UserInfo {
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Info => client.get(format!("{base}/")).send().await?,
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Login { username, password } => {
            client
                .post(format!("{base}/login"))
                .form(&[("username", username), ("password", password)])
                .send()
                .await?
        }
        Commands::Encode { token, text } => {
            client
                .post(format!("{base}/api/rot13"))
                .headers(bearer(&token)?)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?
        }
        Commands::UserInfo { token } => {
            client
                .get(format!("{base}/api/user-info"))
                .headers(bearer(&token)?)
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn bearer(token: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))?,
    );
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
