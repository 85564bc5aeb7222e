use std::process::ExitCode;

use recall_review::config::Config;
use recall_review::{logging, replay};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: recall-review <review-log.jsonl>");
        return ExitCode::from(2);
    };

    let report = match replay::replay_file(&path, &config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, %path, "replay failed");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode replay report");
            ExitCode::FAILURE
        }
    }
}
