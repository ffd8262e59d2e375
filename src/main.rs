use std::env;

use log::error;
use million::config::AppConfig;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let mut config = match AppConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                error!("Configuration error: {e}");
                std::process::exit(1);
            }
        };
        if let Some(port) = raw_args.get(2).and_then(|s| s.parse::<u16>().ok()) {
            config.port = port;
        }
        if let Err(e) = million::api::run_http_server(config).await {
            error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match million::api::run_cli(raw_args) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
