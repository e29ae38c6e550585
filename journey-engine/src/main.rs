use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use journey_engine::search_file::SearchFile;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr so stdout stays valid JSON.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: journey-engine <search.json>");
        return ExitCode::FAILURE;
    };

    let snapshot = match SearchFile::load(&path).and_then(SearchFile::run) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Search failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize snapshot: {e}");
            ExitCode::FAILURE
        }
    }
}
