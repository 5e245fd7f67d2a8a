//! Adjudicator server
//!
//! Usage:
//!   adjudicator --users-file users.json                  # Serve on 127.0.0.1:5000
//!   adjudicator --addr 0.0.0.0:8080 --judge-timeout-secs 30
//!   adjudicator --cors-origin https://debates.example.com
//!   OPENAI_API_KEY=... adjudicator --users-file users.json

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use adjudicator::core::{run_server, EngineConfig, OpenAiSettings, ServerConfig};
use adjudicator::{
    DEFAULT_ADDR, DEFAULT_CORS_ORIGIN, DEFAULT_JUDGE_TIMEOUT_SECS, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL,
    MAX_TITLE_CHARS, VERSION,
};

#[derive(Parser, Debug)]
#[command(
    name = "adjudicator",
    version = VERSION,
    about = "Adjudicator - run two-party debates to a single judged verdict",
    long_about = "Adjudicator serves the session lifecycle API for structured debates.\n\n\
                  One user creates a session and shares its join token, a second user\n\
                  joins, both submit and lock arguments, and once both sides are locked\n\
                  either participant may request the judgment exactly once.\n\n\
                  States:\n  \
                  awaiting_opponent - Created, waiting for the join token to be used\n  \
                  active            - Both parties present, arguments open\n  \
                  awaiting_judgment - Both sides locked, judgment may be requested\n  \
                  judged            - Verdict recorded"
)]
struct Args {
    /// Server address
    #[arg(long, env = "ADJUDICATOR_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// JSON file of users and bearer tokens
    #[arg(long, env = "ADJUDICATOR_USERS_FILE")]
    users_file: Option<PathBuf>,

    /// Browser origin allowed to call the API (repeat or comma-separate for several)
    #[arg(
        long = "cors-origin",
        env = "ADJUDICATOR_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGIN
    )]
    cors_origins: Vec<String>,

    /// Upper bound on one judge call, in seconds
    #[arg(long, env = "ADJUDICATOR_JUDGE_TIMEOUT_SECS", default_value_t = DEFAULT_JUDGE_TIMEOUT_SECS)]
    judge_timeout_secs: u64,

    /// Longest accepted session title
    #[arg(long, env = "ADJUDICATOR_MAX_TITLE_CHARS", default_value_t = MAX_TITLE_CHARS)]
    max_title_chars: usize,

    /// API key for the OpenAI judge
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model used for verdicts
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_OPENAI_MODEL)]
    openai_model: String,

    /// Chat completions endpoint
    #[arg(long, env = "OPENAI_URL", default_value = DEFAULT_OPENAI_URL)]
    openai_url: String,

    /// Disable colors in the startup banner
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            users_file: self.users_file,
            cors_origins: self.cors_origins,
            openai: OpenAiSettings {
                api_key: self.openai_api_key,
                model: self.openai_model,
                url: self.openai_url,
            },
            engine: EngineConfig {
                judge_timeout: Duration::from_secs(self.judge_timeout_secs),
                max_title_chars: self.max_title_chars,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }
    print_header(&args.addr);

    if let Err(e) = run_server(args.into_config()).await {
        eprintln!("{} {}", "Server error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Print startup banner
fn print_header(addr: &str) {
    println!();
    println!("{}", format!("  Adjudicator v{}", VERSION).bold());
    println!("  Listening on {}", addr.cyan());
    println!();
    println!("  GET  /user_sessions              - Sessions created and joined");
    println!("  POST /create_session             - Create session");
    println!("  POST /join_session/:token        - Join session");
    println!("  GET  /session/:id                - Session detail");
    println!("  GET  /session_arguments/:id      - List arguments");
    println!("  POST /submit_argument/:id        - Submit argument");
    println!("  POST /lock_argument/:argument_id - Lock argument");
    println!("  POST /get_judgment/:id           - Request judgment");
    println!("  GET  /health                     - Health check");
    println!();
}
