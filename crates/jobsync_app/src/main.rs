use std::path::Path;
use std::process::ExitCode;

use jobsync_app::logging;
use jobsync_app::{run, AppConfig, CONFIG_FILENAME};
use jobsync_logging::jobsync_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::initialize();
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILENAME));

    match run::run_once(&config).await {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            jobsync_error!("{:#}", err);
            println!("Run aborted: {err:#}");
            ExitCode::FAILURE
        }
    }
}
