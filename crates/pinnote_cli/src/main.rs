//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pinnote_core` linkage.
//! - Report store health for the configured database path.

use pinnote_core::db::open_db;
use pinnote_core::logging::init_logging_from_config;
use pinnote_core::{
    CoreConfig, NoteFeed, NoteRepository, PreferenceFeed, PreferenceRepository,
    SqliteNoteRepository, SqlitePreferenceRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pinnote_core ping={}", pinnote_core::ping());
    println!("pinnote_core version={}", pinnote_core::core_version());

    match probe_store() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pinnote_core probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_store() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    let file_logging = init_logging_from_config(&config)?;
    println!("pinnote_core file_logging={file_logging}");

    let conn = open_db(&config.db_path)?;
    let notes = SqliteNoteRepository::try_new(&conn, NoteFeed::new())?.list_all()?;
    let credentials =
        SqlitePreferenceRepository::try_new(&conn, PreferenceFeed::new())?.load_credentials()?;

    println!("pinnote_core db_path={}", config.db_path.display());
    println!(
        "pinnote_core notes={} protected={}",
        notes.len(),
        notes.iter().filter(|note| note.is_protected).count()
    );
    println!("pinnote_core pin_configured={}", credentials.has_pin());
    Ok(())
}
