use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the todo gateway", long_about = None)]
struct Cli {
    /// Gateway base URL including the API prefix.
    #[arg(short, long, default_value = "http://localhost:3000/api")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all todos
    List,
    /// Show one todo
    Get { id: String },
    /// Create a todo
    Create {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        title: String,
    },
    /// Replace a todo
    Update {
        id: i64,
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        completed: bool,
    },
    /// Delete a todo
    Delete { id: i64 },
    /// Echo query parameters given as key=value pairs
    Echo { params: Vec<String> },
    /// Show gateway status and rate limit budget
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let todos = format!("{}/todos", base);

    let request = match cli.command {
        Commands::List => client.get(&todos),
        Commands::Get { id } => client.get(format!("{}/{}", todos, id)),
        Commands::Create { user_id, title } => client
            .post(&todos)
            .json(&json!({ "userId": user_id, "title": title })),
        Commands::Update {
            id,
            user_id,
            title,
            completed,
        } => client.put(format!("{}/{}", todos, id)).json(&json!({
            "id": id,
            "userId": user_id,
            "title": title,
            "completed": completed,
        })),
        Commands::Delete { id } => client.delete(&todos).json(&json!({ "id": id })),
        Commands::Echo { params } => {
            let pairs: Vec<(String, String)> = params
                .iter()
                .map(|p| match p.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (p.clone(), String::new()),
                })
                .collect();
            client.get(format!("{}/echo", base)).query(&pairs)
        }
        Commands::Status => client.get(format!("{}/status", base)),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        eprintln!("Rate limited: try again later");
        return Ok(());
    }
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
