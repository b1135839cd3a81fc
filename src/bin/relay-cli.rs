use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the Puter relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request through the relay (e.g. `call fs/readdir --body '{"path":"/"}'`)
    Call {
        /// Category and method, e.g. fs/readdir, kv/get, chat/completions
        path: String,

        /// JSON request body
        #[arg(short, long, default_value = "{}")]
        body: String,

        /// Ask for a streamed response and print events as they arrive
        #[arg(short, long)]
        stream: bool,
    },
    /// Check that the relay is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Call { path, body, stream } => {
            let mut body: Value = serde_json::from_str(&body)?;
            if stream {
                if let Value::Object(map) = &mut body {
                    map.insert("stream".into(), json!(true));
                }
            }

            let res = client
                .post(format!("{}/api/proxy", cli.url))
                .query(&[("path", path.as_str())])
                .json(&body)
                .send()
                .await?;

            let is_event_stream = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with("text/event-stream"));

            if is_event_stream {
                print_events(res).await?;
            } else {
                print_response(res).await?;
            }
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_events(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = res.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        buffer.push_str(&String::from_utf8_lossy(&chunk?));
        while let Some(end) = buffer.find("\n\n") {
            let event: String = buffer.drain(..end + 2).collect();
            // NDJSON lines keep their own newline, so frames can be separated
            // by an extra blank line.
            if let Some(data) = event.trim_start_matches('\n').strip_prefix("data: ") {
                println!("{}", data.trim_end_matches('\n'));
            }
        }
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(())
}
