use crate::{config::Config, management::SessionStore, success, warning};

pub async fn logout(config: &Config) {
    let store = SessionStore::new(&config.session_file);
    if !store.exists() {
        warning!("No session stored at {}", config.session_file.display());
        return;
    }

    store.clear().await;
    success!("Logged out, removed {}", config.session_file.display());
}
