use chrono::{DateTime, Duration, Utc};
use tabled::Table;

use crate::{
    config::Config,
    error, info,
    management::{REFRESH_BUFFER_MINUTES, TokenStore},
    success,
    types::{SessionTableRow, TokenRecord},
    utils, warning,
};

/// Prints a table of stored sessions, most recently updated first.
pub async fn sessions(config: Config) {
    let store = open_store(&config).await;

    let records = match store.list().await {
        Ok(records) => records,
        Err(e) => error!("Cannot read token store. Err: {}", e),
    };

    if records.is_empty() {
        warning!("No stored sessions.");
        return;
    }

    let now = Utc::now();
    let rows: Vec<SessionTableRow> = records.iter().map(|r| session_row(r, now)).collect();

    info!("{} stored session(s)", rows.len());
    println!("{}", Table::new(rows));
}

/// Deletes the tokens of every session.
pub async fn clear_tokens(config: Config) {
    let store = open_store(&config).await;

    match store.delete_all().await {
        Ok(0) => warning!("Token store was already empty."),
        Ok(n) => success!("Removed {} stored session(s).", n),
        Err(e) => error!("Cannot clear token store. Err: {}", e),
    }
}

async fn open_store(config: &Config) -> TokenStore {
    let store = match TokenStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open token store {}. Err: {}", config.database_url, e),
    };

    if let Err(e) = store.migrate().await {
        error!("Cannot prepare token store. Err: {}", e);
    }

    store
}

fn session_row(record: &TokenRecord, now: DateTime<Utc>) -> SessionTableRow {
    SessionTableRow {
        session: utils::mask_session_id(&record.session_id),
        expires: record.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        status: token_status(record.expires_at, now).to_string(),
        updated: record.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
}

fn token_status(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> &'static str {
    if expires_at <= now {
        "expired"
    } else if expires_at <= now + Duration::minutes(REFRESH_BUFFER_MINUTES) {
        "refresh due"
    } else {
        "valid"
    }
}
