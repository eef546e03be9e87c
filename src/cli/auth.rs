use std::{io, sync::Arc, time::Duration};

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Config,
    error, info,
    management::{DeviceLink, LinkPresenter, SessionManager, SessionStore},
    success,
    tidal::TidalClient,
    types::CredentialBundle,
    utils, warning,
};

/// Prints the verification link and spins until the login completes.
struct TerminalPresenter {
    open_browser: bool,
    spinner: ProgressBar,
}

impl TerminalPresenter {
    fn new(open_browser: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        TerminalPresenter {
            open_browser,
            spinner,
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl LinkPresenter for TerminalPresenter {
    async fn present(&self, link: &DeviceLink) {
        println!("{}", "=".repeat(60));
        info!("Please open this URL in your browser to authenticate:");
        println!("\n  {}\n", link.url);
        info!(
            "Link expires in {} seconds ({} minutes)",
            link.expires_in,
            link.expires_in / 60
        );
        println!("{}", "=".repeat(60));

        if self.open_browser {
            open_browser(&link.url).await;
        }

        self.spinner
            .set_message("Waiting for you to complete authentication in browser...");
        self.spinner.enable_steady_tick(Duration::from_millis(100));
    }
}

async fn open_browser(url: &str) {
    let target = url.to_string();
    let opened = utils::run_blocking(move || webbrowser::open(&target)).await;
    if !matches!(opened, Ok(Ok(()))) {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        );
    }
}

/// Interactive authentication: reuses a valid stored session, otherwise runs
/// the device flow (or the PKCE flow) and saves the new session.
pub async fn auth(config: &Config, pkce: bool) {
    let client = match TidalClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(e) => error!("Cannot set up the TIDAL client: {}", e),
    };
    let store = SessionStore::new(&config.session_file);
    let sessions = SessionManager::new(client.clone(), store);

    if sessions.ensure().await.is_ok() {
        success!("Already authenticated with TIDAL!");
        info!("Session file: {}", config.session_file.display());
        return;
    }

    info!("Starting TIDAL OAuth authentication...");
    let bundle = if pkce {
        pkce_login(&client, config.open_browser).await
    } else {
        device_login(&sessions, config.open_browser).await
    };

    match sessions.establish(bundle).await {
        Ok(session) => {
            success!("Successfully authenticated with TIDAL!");
            info!(
                "User {} ({}), session saved to: {}",
                session.user_id,
                session.country_code,
                config.session_file.display()
            );
            info!("You can now use the MCP server - all tools will work automatically.");
        }
        Err(e) => error!("{}", e),
    }
}

async fn device_login(sessions: &SessionManager, open_browser: bool) -> CredentialBundle {
    let presenter = TerminalPresenter::new(open_browser);
    let result = sessions.acquire_via_oauth(&presenter).await;
    presenter.finish();

    match result {
        Ok(bundle) => bundle,
        Err(e) => error!("Authentication failed: {}", e),
    }
}

async fn pkce_login(client: &TidalClient, open: bool) -> CredentialBundle {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let unique_key = utils::generate_client_unique_key();

    let login_url = match client.pkce_login_url(&code_challenge, &unique_key) {
        Ok(url) => url.to_string(),
        Err(e) => error!("Cannot build the login URL: {}", e),
    };

    info!("Please open this URL in your browser and log in:");
    println!("\n  {}\n", login_url);
    if open {
        open_browser(&login_url).await;
    }
    info!("After logging in you land on a page that says \"Oops\".");
    info!("Copy the full URL of that page and paste it here:");

    let pasted = match utils::run_blocking(read_line).await {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => error!("Cannot read from stdin: {}", e),
        Err(e) => error!("Cannot read from stdin: {}", e),
    };

    let Some(code) = utils::extract_query_param(&pasted, "code") else {
        error!("The pasted URL does not carry an authorization code.");
    };

    match client
        .exchange_pkce_code(&code, &code_verifier, &unique_key)
        .await
    {
        Ok(token) => CredentialBundle::from_token(token, true),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
