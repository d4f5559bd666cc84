use anyhow::Result;
use clap::Parser;
use rouilleshare::config::Config;
use rouilleshare::core_cli::Cli;
use rouilleshare::core_log::logger::init_logger;
use rouilleshare::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments, exiting with 1 on bad usage
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logger("info", args.verbose);

    // Load configuration from the TOML file when one is given
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // Override the credential file from CLI if provided
    if let Some(users) = args.users {
        config.server.users_file = users;
    }

    // Run the share server
    server::run(config, args.port, &args.share_dir).await?;

    Ok(())
}
