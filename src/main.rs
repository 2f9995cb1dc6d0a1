use anyhow::Result;
use clap::{Parser, ValueEnum};

use nodejs_docs_mcp::config::Config;
use nodejs_docs_mcp::server;

#[derive(Parser, Debug)]
#[command(version, about = "Node.js API Documentation MCP Server")]
struct Cli {
    /// Type of server to run
    #[arg(short, long, value_enum, default_value_t = ServerType::Stdio)]
    server_type: ServerType,

    /// Address for the SSE server
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    address: String,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    config: Config,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ServerType {
    /// Start an SSE server
    Sse,
    /// Start a stdio server
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    server::init_tracing(cli.debug);

    match cli.server_type {
        ServerType::Sse => server::start_sse_server(&cli.address, &cli.config).await?,
        ServerType::Stdio => server::start_stdio_server(&cli.config).await?,
    }

    Ok(())
}
