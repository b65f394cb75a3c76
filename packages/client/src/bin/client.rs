//! Terminal chat client for the Hiroba relay.
//!
//! Prints the recent history, then live messages and the online count.
//! Every line typed at the prompt is posted under the given nickname.
//! Automatically reconnects on disconnection (max 5 attempts with 3 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --nickname alice
//! cargo run --bin hiroba-client -- -n bob --url ws://127.0.0.1:8000/ws/chat
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal client for the Hiroba chat relay", long_about = None)]
struct Args {
    /// Nickname shown next to your messages
    #[arg(short = 'n', long)]
    nickname: String,

    /// WebSocket endpoint of the relay
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8000/ws/chat")]
    url: String,

    /// Base URL of the HTTP API (history)
    #[arg(short = 'a', long, default_value = "http://127.0.0.1:8000")]
    api_url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_CRATE_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = hiroba_client::run_client(args.url, args.api_url, args.nickname).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
