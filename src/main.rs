use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;
mod endpoint;
mod prelude;
mod server;

use endpoint::Endpoint;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the echo server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on.
        #[arg(long, default_value_t = 12346)]
        port: u16,
    },
    /// Send one message to an echo server and print the response.
    Send {
        /// Server host.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Server port.
        #[arg(long, default_value_t = 12346)]
        port: u16,
        /// Message to send instead of the built-in one.
        #[arg(long)]
        message: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Serve { host, port } => server::main(Endpoint::new(host, port)),
        Command::Send {
            host,
            port,
            message,
        } => client::main(
            Endpoint::new(host, port),
            message.unwrap_or_else(|| client::DEFAULT_MESSAGE.to_string()),
        ),
    }
}
