use std::process;

use accessctl_config::Settings;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(3);
        }
    };

    let exit_code = accessctl_cli::run(settings).await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
