use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = scan_profiles::cli::Cli::parse();

    if let Err(err) = scan_profiles::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
