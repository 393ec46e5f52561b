use crate::backend::model::{Account, Plan, RecipeSummary};
use crate::backend::session::Session;
use crate::backend::validation::{validate_field, Field, ValidationErrors};
use crate::backend::api::ApiError;
use crate::backend::{AppCmd, AppEvent};

pub const RECIPE_DELETE_FAILED: &str = "Recipe could not be deleted. Try again later";
pub const TRANSACTION_FAILED: &str = "Error in the transaction.";
pub const SAVE_FAILED: &str = "Your profile could not be saved. Try again later";
pub const PROVIDER_LOGOUT_FAILED: &str = "Google log out failed. Try again later";
pub const ACCOUNT_DELETE_FAILED: &str = "The account could not be deleted. Try again later";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    NotFound,
    Viewing,
    Editing,
}

/// Identifies one load; results carrying an older generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub username: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub account: Account,
    pub recipes: Vec<RecipeSummary>,
    pub is_owner: bool,
    pub can_upgrade: bool,
    pub show_provider_logout: bool,
    pub google_modal_open: bool,
}

impl ProfileView {
    /// Phone and birth date are only shown to the owner.
    pub fn cell_phone(&self) -> Option<&str> {
        self.account.cell_phone.as_deref().filter(|_| self.is_owner)
    }

    pub fn birth_date(&self) -> Option<&str> {
        self.account.birth_date.as_deref().filter(|_| self.is_owner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditView {
    pub draft: Account,
    pub errors: ValidationErrors,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView {
    Loading,
    NotFound,
    Viewing(ProfileView),
    Editing(EditView),
}

/// State of the profile page for one route username.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileScreen {
    username: String,
    generation: u64,
    phase: Phase,
    account: Option<Account>,
    recipes: Vec<RecipeSummary>,
    draft: Option<Account>,
    errors: ValidationErrors,
    google_modal_open: bool,
    saving: bool,
    alert: Option<String>,
    account_deleted: bool,
}

impl Default for ProfileScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            generation: 0,
            phase: Phase::Loading,
            account: None,
            recipes: Vec::new(),
            draft: None,
            errors: ValidationErrors::default(),
            google_modal_open: false,
            saving: false,
            alert: None,
            account_deleted: false,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    #[cfg(test)]
    pub fn recipes(&self) -> &[RecipeSummary] {
        &self.recipes
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn account_deleted(&self) -> bool {
        self.account_deleted
    }

    /// Starts a fresh fetch for `username`, discarding any edit in progress.
    pub fn load(&mut self, username: &str) -> AppCmd {
        if self.username != username {
            self.account = None;
            self.recipes.clear();
            self.account_deleted = false;
            self.username = username.to_string();
        }
        self.generation += 1;
        self.phase = Phase::Loading;
        self.draft = None;
        self.errors = ValidationErrors::default();
        self.google_modal_open = false;
        self.saving = false;
        tracing::debug!("Loading profile {} (generation {})", username, self.generation);
        AppCmd::LoadProfile {
            ticket: LoadTicket {
                username: self.username.clone(),
                generation: self.generation,
            },
        }
    }

    fn reload(&mut self) -> AppCmd {
        let username = self.username.clone();
        self.load(&username)
    }

    /// Called when the page unmounts; results still in flight are ignored from now on.
    pub fn abandon(&mut self) {
        let generation = self.generation + 1;
        *self = Self::new();
        self.generation = generation;
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale result (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    pub fn enter_edit(&mut self, session: &Session) -> bool {
        if self.phase != Phase::Viewing || !session.is_owner(&self.username) {
            return false;
        }
        let Some(account) = self.account.as_ref() else {
            return false;
        };
        self.draft = Some(account.draft());
        self.errors = ValidationErrors::default();
        self.google_modal_open = false;
        self.phase = Phase::Editing;
        true
    }

    /// Leaves the form without saving; the account is fetched again.
    pub fn cancel_edit(&mut self) -> Option<AppCmd> {
        if self.phase != Phase::Editing {
            return None;
        }
        Some(self.reload())
    }

    pub fn update_field(&mut self, field: Field, value: &str) {
        if let Some(draft) = self.draft.as_mut() {
            validate_field(draft, &mut self.errors, value, field);
        }
    }

    pub fn update_avatar(&mut self, avatar: String) {
        if let Some(draft) = self.draft.as_mut() {
            draft.avatar = Some(avatar);
        }
    }

    /// Marks the save button busy. Returns `None` while a save is already running.
    pub fn begin_save(&mut self) -> Option<AppCmd> {
        if self.phase != Phase::Editing || self.saving {
            return None;
        }
        let draft = self.draft.clone()?;
        self.saving = true;
        Some(AppCmd::SaveAccount {
            username: self.username.clone(),
            draft,
        })
    }

    pub fn request_plan_upgrade(&self, plan: Plan, session: &Session) -> Option<AppCmd> {
        if self.phase != Phase::Viewing || !session.is_owner(&self.username) {
            return None;
        }
        let account = self.account.as_ref()?;
        if plan <= account.plan {
            return None;
        }
        Some(AppCmd::UpgradePlan {
            username: self.username.clone(),
            plan,
            account: account.clone(),
        })
    }

    pub fn open_google_modal(&mut self) {
        self.google_modal_open = true;
    }

    pub fn close_google_modal(&mut self) {
        self.google_modal_open = false;
    }

    /// The provider flag drops before the logout call goes out.
    pub fn confirm_provider_logout(&mut self, session: &mut Session) -> Option<AppCmd> {
        if !session.provider_login() {
            self.google_modal_open = false;
            return None;
        }
        session.clear_provider_login();
        Some(AppCmd::LogoutProvider)
    }

    /// Issued after the user confirmed. With a provider session active the backend logs
    /// out of the provider before deleting the account.
    pub fn confirm_account_delete(&mut self, session: &mut Session) -> Option<AppCmd> {
        if !session.is_owner(&self.username) {
            return None;
        }
        let provider_logout_first = session.provider_login();
        if provider_logout_first {
            session.clear_provider_login();
        }
        Some(AppCmd::DeleteAccount {
            username: self.username.clone(),
            provider_logout_first,
        })
    }

    pub fn confirm_recipe_delete(&self, id: &str) -> Option<AppCmd> {
        self.recipes
            .iter()
            .any(|r| r.id == id)
            .then(|| AppCmd::DeleteRecipe { id: id.to_string() })
    }

    /// Applies a backend result. Returns a follow-up command when the result triggers one.
    pub fn apply(&mut self, event: AppEvent, session: &mut Session) -> Option<AppCmd> {
        match event {
            AppEvent::AccountFetched { generation, account } => {
                if self.is_current(generation) && self.phase == Phase::Loading {
                    self.phase = if account.is_some() {
                        Phase::Viewing
                    } else {
                        Phase::NotFound
                    };
                    self.account = account;
                }
                None
            }
            AppEvent::RecipesFetched { generation, recipes } => {
                if self.is_current(generation) {
                    self.recipes = recipes.unwrap_or_default();
                }
                None
            }
            AppEvent::AccountSaved { username } => {
                self.saving = false;
                if self.phase == Phase::Editing && username == self.username {
                    tracing::info!("Saved profile {}", username);
                    return Some(self.reload());
                }
                None
            }
            AppEvent::AccountSaveFailed(err) => {
                self.saving = false;
                match err {
                    ApiError::Validation(fields) => self.errors.merge_wire(&fields),
                    _ => self.alert = Some(SAVE_FAILED.to_string()),
                }
                None
            }
            AppEvent::PlanUpgraded { username, plan } => {
                if session.is_owner(&username) {
                    session.set_plan(plan);
                }
                if username == self.username && self.phase == Phase::Viewing {
                    return Some(self.reload());
                }
                None
            }
            AppEvent::PlanUpgradeFailed(_) => {
                self.alert = Some(TRANSACTION_FAILED.to_string());
                None
            }
            AppEvent::ProviderLoggedOut => {
                self.google_modal_open = false;
                None
            }
            AppEvent::ProviderLogoutFailed(_) => {
                self.alert = Some(PROVIDER_LOGOUT_FAILED.to_string());
                None
            }
            AppEvent::AccountDeleted { username } => {
                if username == self.username {
                    self.account_deleted = true;
                }
                if session.is_owner(&username) {
                    session.sign_out();
                    // Later requests must not carry the deleted user's token.
                    return Some(AppCmd::SetToken { token: None });
                }
                None
            }
            AppEvent::AccountDeleteFailed(_) => {
                self.alert = Some(ACCOUNT_DELETE_FAILED.to_string());
                None
            }
            AppEvent::RecipeDeleted { id } => {
                self.recipes.retain(|r| r.id != id);
                None
            }
            AppEvent::RecipeDeleteFailed { .. } => {
                self.alert = Some(RECIPE_DELETE_FAILED.to_string());
                None
            }
        }
    }

    /// What the page should render for this viewer.
    pub fn view(&self, session: &Session) -> ScreenView {
        match (self.phase, self.account.as_ref()) {
            (Phase::Loading, _) => ScreenView::Loading,
            (Phase::NotFound, _) | (_, None) => ScreenView::NotFound,
            (Phase::Viewing, Some(account)) => {
                let is_owner = session.is_owner(&self.username);
                ScreenView::Viewing(ProfileView {
                    account: account.clone(),
                    recipes: self.recipes.clone(),
                    is_owner,
                    can_upgrade: is_owner && !account.plan.is_top(),
                    show_provider_logout: session.provider_login() && !account.plan.is_lowest(),
                    google_modal_open: self.google_modal_open,
                })
            }
            (Phase::Editing, Some(account)) => ScreenView::Editing(EditView {
                draft: self.draft.clone().unwrap_or_else(|| account.draft()),
                errors: self.errors.clone(),
                saving: self.saving,
            }),
        }
    }
}
