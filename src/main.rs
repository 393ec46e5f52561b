mod backend;
mod components;
mod config;

use backend::session::Session;
use backend::{AppCmd, AppEvent};
use components::home_page::HomeComponent;
use components::nav_bar::NavComponent;
use components::profile_page::ProfileComponent;
use components::AppState;
use config::Config;

use dioxus::prelude::*;
use tokio::sync::mpsc;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[layout(NavComponent)]
    #[route("/")]
    HomeComponent {},
    #[route("/profile/:username")]
    ProfileComponent { username: String },
}

fn main() {
    init_logging(&Config::from_env());
    dioxus::launch(App);
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging(config: &Config) {
    // Dioxus installs its own logger when none is set yet.
    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
fn init_logging(_config: &Config) {}

fn session_from_config(config: &Config) -> Session {
    match config.session_token.as_deref() {
        Some(raw) => Session::from_token(raw, config.provider_login).unwrap_or_else(|e| {
            tracing::warn!("Ignoring session token: {}", e);
            Session::anonymous()
        }),
        None => Session::anonymous(),
    }
}

#[component]
fn App() -> Element {
    let config = use_hook(Config::from_env);
    let session_config = config.clone();
    let app_state = AppState::new(move || session_from_config(&session_config));
    use_context_provider(|| app_state);

    let cmd_tx = use_hook(move || {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCmd>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

        let token = app_state.session.peek().raw_token().map(str::to_string);
        spawn(backend::init(config.clone(), token, cmd_rx, event_tx));

        let followup_tx = cmd_tx.clone();
        let mut app_state = app_state;
        spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if let Some(cmd) = app_state.apply(event) {
                    if followup_tx.send(cmd).is_err() {
                        tracing::error!("Backend stopped, dropping follow-up command");
                    }
                }
            }
        });

        cmd_tx
    });
    use_context_provider(|| cmd_tx);

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }
        Router::<Route> {}
    }
}
