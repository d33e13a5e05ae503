use clap::Parser;
use infinite_ls::lsp::InfiniteLs;
use tokio::io::{stdin, stdout};
use tower_lsp_server::{LspService, Server};

/// Language server resolving per-directory plugin configurations
#[derive(Parser)]
#[command(name = "infinite-ls")]
#[command(version)]
#[command(about = "Language server resolving per-directory plugin configurations")]
struct Cli {
    /// Communicate over stdin/stdout (the only transport; accepted for client compatibility)
    #[arg(long)]
    stdio: bool,

    /// Log filter written to stderr, e.g. `info` or `infinite_ls::workspace=debug`.
    /// Falls back to RUST_LOG, then `warn`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = &cli.log_level {
        logger.parse_filters(filter);
    }
    logger.target(env_logger::Target::Stderr).init();

    if !cli.stdio {
        log::debug!(target: "infinite_ls::main", "No transport flag given; using stdio");
    }

    let stdin = stdin();
    let stdout = stdout();

    let (service, socket) = LspService::new(InfiniteLs::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
