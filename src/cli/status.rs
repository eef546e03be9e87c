use std::sync::Arc;

use tabled::{Table, Tabled};

use crate::{
    config::Config,
    management::{SessionManager, SessionStore},
    tidal::TidalClient,
    warning,
};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Property")]
    property: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(property: &'static str, value: impl Into<String>) -> StatusRow {
    StatusRow {
        property,
        value: value.into(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Prints where the session lives and whether TIDAL still accepts it.
/// Unlike the tools, a rejected or malformed session is reported but not deleted.
pub async fn status(config: &Config) {
    let store = SessionStore::new(&config.session_file);
    let mut rows = vec![
        row("Session file", config.session_file.display().to_string()),
        row("Stored", yes_no(store.exists())),
    ];

    let bundle = match store.read().await {
        Ok(bundle) => bundle,
        Err(e) => {
            rows.push(row("Readable", yes_no(false)));
            warning!("Cannot read the session file: {}", e);
            None
        }
    };

    if let Some(bundle) = bundle {
        rows.push(row("Login variant", if bundle.is_pkce { "PKCE" } else { "device" }));

        match TidalClient::new(config) {
            Ok(client) => {
                let sessions = SessionManager::new(Arc::new(client), store);
                match sessions.inspect().await {
                    Some(info) => {
                        rows.push(row("Valid", yes_no(true)));
                        rows.push(row("User ID", info.user_id.to_string()));
                        rows.push(row("Country", info.country_code));
                    }
                    None => rows.push(row("Valid", yes_no(false))),
                }
            }
            Err(e) => warning!("Cannot check the session: {}", e),
        }
    }

    println!("{}", Table::new(rows));
}
