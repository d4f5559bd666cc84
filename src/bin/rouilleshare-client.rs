use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rouilleshare::core_cli::ClientCli;
use rouilleshare::core_client::shell::{login, run_commands};
use rouilleshare::core_client::ShareClient;
use rouilleshare::core_log::logger::init_logger;
use rouilleshare::ShareError;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments, exiting with 1 on bad usage
    let args = match ClientCli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logger("warn", args.verbose);

    let mut client = ShareClient::connect(&args.server_ip, args.port).await?;
    println!("Connected to {}:{}", args.server_ip, args.port);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    // Any failure before the session is authenticated exits with 1
    if let Err(e) = login(&mut client, &mut lines, &mut stdout).await {
        let reason = match e {
            ShareError::ServerRefused(response) => response,
            other => other.to_string(),
        };
        eprintln!("{} {}", "Auth failed:".red(), reason);
        std::process::exit(1);
    }

    if let Err(e) = run_commands(client, &mut lines, &mut stdout, &args.download_dir).await {
        eprintln!("{}", e.to_string().red());
    }
    Ok(())
}
