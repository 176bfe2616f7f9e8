use std::path::Path;
use std::process::ExitCode;

use jobsync_app::logging;
use jobsync_app::{setup, AppConfig, CONFIG_FILENAME};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::initialize();
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILENAME));

    println!("jobsync setup check");
    let report = setup::run_checks(&config).await;
    print!("{report}");

    if report.passed() {
        println!("Setup complete; run `jobsync` to sync listings");
        ExitCode::SUCCESS
    } else {
        println!("Please fix the failed checks above");
        ExitCode::FAILURE
    }
}
