use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = patmux::cli::Cli::parse();
    if let Err(e) = patmux::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
