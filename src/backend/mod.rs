pub mod api;
pub mod model;
pub mod screen;
pub mod session;
pub mod validation;

use api::{ApiError, HttpApi, ProfileApi};
use futures::stream::{FuturesUnordered, StreamExt};
use model::{recipes_created_by, Account, Plan, RecipeSummary};
use screen::LoadTicket;
use tokio::sync::mpsc;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCmd {
    LoadProfile { ticket: LoadTicket },
    SaveAccount { username: String, draft: Account },
    UpgradePlan { username: String, plan: Plan, account: Account },
    LogoutProvider,
    DeleteAccount { username: String, provider_logout_first: bool },
    DeleteRecipe { id: String },
    SetToken { token: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    AccountFetched { generation: u64, account: Option<Account> },
    RecipesFetched { generation: u64, recipes: Option<Vec<RecipeSummary>> },
    AccountSaved { username: String },
    AccountSaveFailed(ApiError),
    PlanUpgraded { username: String, plan: Plan },
    PlanUpgradeFailed(String),
    ProviderLoggedOut,
    ProviderLogoutFailed(String),
    AccountDeleted { username: String },
    AccountDeleteFailed(String),
    RecipeDeleted { id: String },
    RecipeDeleteFailed { id: String },
}

pub struct Backend<A> {
    api: A,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl<A: ProfileApi> Backend<A> {
    pub fn new(api: A, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { api, event_tx }
    }

    /// Starts every command as it arrives, so a slow request never holds up the ones behind it.
    /// Returns once the UI drops its sender and the commands in flight have finished.
    pub async fn run(&self, mut cmd_rx: mpsc::UnboundedReceiver<AppCmd>) {
        let mut in_flight = FuturesUnordered::new();
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => in_flight.push(self.handle_command(cmd)),
                    None => break,
                },
                Some(()) = in_flight.next(), if !in_flight.is_empty() => {}
            }
        }
        tracing::info!("Command channel closed, finishing {} pending command(s)", in_flight.len());
        while in_flight.next().await.is_some() {}
    }

    fn emit(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("UI is gone, dropping backend event");
        }
    }

    pub async fn handle_command(&self, cmd: AppCmd) {
        match cmd {
            AppCmd::LoadProfile { ticket } => {
                let LoadTicket { username, generation } = ticket;
                // Account and recipes report independently; one failing leaves the other alone.
                let account = async {
                    let account = match self.api.fetch_account(&username).await {
                        Ok(account) => account,
                        Err(e) => {
                            tracing::warn!("Failed to fetch account {}: {}", username, e);
                            None
                        }
                    };
                    self.emit(AppEvent::AccountFetched { generation, account });
                };
                let recipes = async {
                    let recipes = match self.api.fetch_recipes().await {
                        Ok(all) => Some(recipes_created_by(all, &username)),
                        Err(e) => {
                            tracing::warn!("Failed to fetch recipes: {}", e);
                            None
                        }
                    };
                    self.emit(AppEvent::RecipesFetched { generation, recipes });
                };
                futures::join!(account, recipes);
            }
            AppCmd::SaveAccount { username, draft } => {
                match self.api.modify_account(&username, &draft).await {
                    Ok(()) => self.emit(AppEvent::AccountSaved { username }),
                    Err(e) => {
                        tracing::warn!("Failed to save account {}: {}", username, e);
                        self.emit(AppEvent::AccountSaveFailed(e));
                    }
                }
            }
            AppCmd::UpgradePlan { username, plan, account } => {
                match self.api.upgrade_plan(&username, plan, &account).await {
                    Ok(()) => {
                        tracing::info!("Upgraded {} to the {} plan", username, plan);
                        self.emit(AppEvent::PlanUpgraded { username, plan });
                    }
                    Err(e) => {
                        tracing::error!("Plan upgrade for {} failed: {}", username, e);
                        self.emit(AppEvent::PlanUpgradeFailed(e.to_string()));
                    }
                }
            }
            AppCmd::LogoutProvider => {
                self.logout_provider().await;
            }
            AppCmd::DeleteAccount { username, provider_logout_first } => {
                if provider_logout_first && !self.logout_provider().await {
                    tracing::warn!("Not deleting {}: Google log out failed", username);
                    return;
                }
                match self.api.delete_account(&username).await {
                    Ok(()) => {
                        tracing::info!("Deleted account {}", username);
                        self.emit(AppEvent::AccountDeleted { username });
                    }
                    Err(e) => {
                        tracing::error!("Failed to delete account {}: {}", username, e);
                        self.emit(AppEvent::AccountDeleteFailed(e.to_string()));
                    }
                }
            }
            AppCmd::SetToken { token } => {
                tracing::debug!("Bearer token {}", if token.is_some() { "replaced" } else { "cleared" });
                self.api.set_token(token);
            }
            AppCmd::DeleteRecipe { id } => {
                match self.api.delete_recipe(&id).await {
                    Ok(()) => self.emit(AppEvent::RecipeDeleted { id }),
                    Err(e) => {
                        tracing::error!("Failed to delete recipe {}: {}", id, e);
                        self.emit(AppEvent::RecipeDeleteFailed { id });
                    }
                }
            }
        }
    }

    async fn logout_provider(&self) -> bool {
        match self.api.logout_provider().await {
            Ok(()) => {
                tracing::info!("Logged out of Google");
                self.emit(AppEvent::ProviderLoggedOut);
                true
            }
            Err(e) => {
                tracing::error!("Google log out failed: {}", e);
                self.emit(AppEvent::ProviderLogoutFailed(e.to_string()));
                false
            }
        }
    }
}

pub async fn init(
    config: Config,
    token: Option<String>,
    cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) {
    match HttpApi::new(&config.api_base_url, token) {
        Ok(api) => Backend::new(api, event_tx).run(cmd_rx).await,
        Err(e) => tracing::error!("Failed to create API client: {}", e),
    }
}
