use dioxus::core::use_drop;
use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use crate::backend::AppCmd;
use crate::backend::model::{Plan, RecipeSummary};
use crate::backend::screen::{EditView, ProfileView, ScreenView};
use crate::backend::validation::Field;
use crate::components::common::{alert, confirm, Avatar, PlansPopover, RecipeCard, Spinner, UploadImage};
use crate::components::AppState;
use crate::Route;

const LOGO: Asset = asset!("/assets/small-logo.svg");

fn send(cmd_tx: &UnboundedSender<AppCmd>, cmd: Option<AppCmd>) {
    if let Some(cmd) = cmd {
        if let Err(e) = cmd_tx.send(cmd) {
            tracing::error!("Backend is gone, dropping command: {:?}", e.0);
        }
    }
}

#[component]
pub fn ProfileComponent(username: String) -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();
    let nav = navigator();

    // Fetch on mount and whenever the route points at another user
    let cmd_tx_load = cmd_tx.clone();
    use_effect(use_reactive(&username, move |username| {
        let cmd = app_state.screen.write().load(&username);
        send(&cmd_tx_load, Some(cmd));
    }));

    use_drop(move || app_state.screen.write().abandon());

    use_effect(move || {
        let pending = app_state.screen.read().alert().map(str::to_string);
        if let Some(message) = pending {
            app_state.screen.write().take_alert();
            alert(&message);
        }
    });

    use_effect(move || {
        if app_state.screen.read().account_deleted() {
            nav.push(Route::HomeComponent {});
        }
    });

    let view = app_state.screen.read().view(&app_state.session.read());

    match view {
        ScreenView::Loading => rsx! {
            div { class: "page-container profile-page centered",
                Spinner {}
            }
        },
        ScreenView::NotFound => rsx! {
            div { class: "page-container profile-page centered",
                div { class: "empty-state",
                    div { class: "empty-state-icon", "☹" }
                    b { class: "empty-state-title", "No Data Found" }
                }
            }
        },
        ScreenView::Viewing(view) => rsx! {
            ProfileDetails { view }
        },
        ScreenView::Editing(edit) => rsx! {
            ProfileEditForm { edit }
        },
    }
}

#[component]
fn ProfileDetails(view: ProfileView) -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();

    let account = view.account.clone();
    let plan = account.plan;
    let initials = account.initials();

    let on_upgrade = {
        let cmd_tx = cmd_tx.clone();
        move |new_plan: Plan| {
            let cmd = app_state
                .screen
                .read()
                .request_plan_upgrade(new_plan, &app_state.session.read());
            send(&cmd_tx, cmd);
        }
    };

    let on_delete_account = {
        let cmd_tx = cmd_tx.clone();
        move |_| {
            let cmd_tx = cmd_tx.clone();
            spawn(async move {
                if confirm("Are you sure you want to delete the account?").await {
                    let cmd = {
                        let mut session = app_state.session.write();
                        app_state.screen.write().confirm_account_delete(&mut session)
                    };
                    send(&cmd_tx, cmd);
                }
            });
        }
    };

    let on_edit = move |_| {
        let entered = app_state.screen.write().enter_edit(&app_state.session.read());
        if !entered {
            tracing::warn!("Edit requested by someone other than the owner");
        }
    };

    rsx! {
        div { class: "page-container profile-page animate-fade-in",

            // Profile card
            div { class: "panel profile-card",
                div { class: "profile-info",
                    Avatar { src: account.avatar.clone(), initials: initials, large: true }
                    div { class: "section-stack",

                        // Basic info
                        div { class: "profile-names",
                            h1 { class: "profile-name", "{account.full_name}" }
                            span { class: "profile-username", "@{account.username}" }
                        }
                        p { class: "user-info", "Email: " i { "{account.email}" } }
                        if let Some(phone) = view.cell_phone() {
                            p { class: "user-info", "Phone: " i { "{phone}" } }
                        }
                        if let Some(birth_date) = view.birth_date() {
                            p { class: "user-info", "Birth Date: " i { "{birth_date}" } }
                        }

                        // Plan
                        div { class: "plan-box",
                            button { class: "btn btn-plan", disabled: true, "{plan} Plan" }
                            if view.can_upgrade {
                                PlansPopover { current: plan, on_success: on_upgrade }
                            }
                        }

                        if view.show_provider_logout {
                            button {
                                class: "btn btn-google",
                                onclick: move |_| app_state.screen.write().open_google_modal(),
                                "Google log out"
                            }
                        }
                    }
                }

                if view.is_owner {
                    div { class: "owner-actions",
                        button {
                            class: "icon-button icon-danger",
                            aria_label: "delete",
                            onclick: on_delete_account,
                            "🗑"
                        }
                        button {
                            class: "icon-button",
                            aria_label: "modify",
                            onclick: on_edit,
                            "✎"
                        }
                    }
                }
            }

            if view.google_modal_open {
                GoogleLogoutModal {}
            }

            // Recipes
            if !view.recipes.is_empty() {
                div { class: "recipe-container",
                    h2 { class: "recipe-container-title",
                        if view.is_owner { "My Recipes" } else { "Recipes by @{account.username}" }
                    }
                    div { class: "recipe-grid",
                        for recipe in view.recipes.iter() {
                            RecipeTile {
                                key: "{recipe.id}",
                                recipe: recipe.clone(),
                                deletable: view.is_owner,
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn RecipeTile(recipe: RecipeSummary, deletable: bool) -> Element {
    let app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();

    let id = recipe.id.clone();
    let on_delete = move |_| {
        let cmd_tx = cmd_tx.clone();
        let id = id.clone();
        spawn(async move {
            if confirm("Are you sure you want to delete the recipe?").await {
                let cmd = app_state.screen.read().confirm_recipe_delete(&id);
                send(&cmd_tx, cmd);
            }
        });
    };

    rsx! {
        div { class: "recipe-tile",
            RecipeCard { recipe }
            if deletable {
                button {
                    class: "recipe-delete",
                    aria_label: "delete recipe",
                    onclick: on_delete,
                    "🗑"
                }
            }
        }
    }
}

#[component]
fn GoogleLogoutModal() -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();

    let on_confirm = move |_| {
        let cmd = {
            let mut session = app_state.session.write();
            app_state.screen.write().confirm_provider_logout(&mut session)
        };
        send(&cmd_tx, cmd);
    };

    rsx! {
        div {
            class: "modal-backdrop animate-fade-in",
            onclick: move |_| app_state.screen.write().close_google_modal(),

            div {
                class: "modal",
                onclick: move |e| e.stop_propagation(),
                div { class: "modal-header",
                    img { src: LOGO, alt: "logo", class: "modal-logo" }
                    h3 { "Are you sure you want to log out from Google?" }
                    p { "You will not be able to synchronize your events with Google Calendar" }
                }
                div { class: "action-group",
                    button { class: "btn btn-danger", onclick: on_confirm, "Log out" }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| app_state.screen.write().close_google_modal(),
                        "Cancel"
                    }
                }
            }
        }
    }
}

#[component]
fn ProfileEditForm(edit: EditView) -> Element {
    let mut app_state = use_context::<AppState>();
    let cmd_tx = use_context::<UnboundedSender<AppCmd>>();

    let draft = edit.draft.clone();
    let errors = edit.errors.clone();
    let initials = draft.initials();

    let on_save = {
        let cmd_tx = cmd_tx.clone();
        move |_| {
            let cmd = app_state.screen.write().begin_save();
            send(&cmd_tx, cmd);
        }
    };

    let on_cancel = move |_| {
        let cmd = app_state.screen.write().cancel_edit();
        send(&cmd_tx, cmd);
    };

    rsx! {
        div { class: "page-container profile-page animate-fade-in",
            div { class: "panel profile-card",
                button {
                    class: "icon-button owner-actions",
                    aria_label: "stop editing",
                    onclick: on_cancel,
                    "✕"
                }

                div { class: "profile-info",
                    UploadImage {
                        avatar: draft.avatar.clone(),
                        initials: initials,
                        on_change: move |url: String| app_state.screen.write().update_avatar(url),
                    }
                    div { class: "section-stack w-full",
                        FormField {
                            label: "Name",
                            field: Field::FullName,
                            value: draft.full_name.clone(),
                            error: errors.get(Field::FullName).to_string(),
                        }
                        FormField {
                            label: "Password",
                            field: Field::Password,
                            value: draft.password.clone(),
                            error: errors.get(Field::Password).to_string(),
                            input_type: "password",
                            placeholder: "New Password",
                        }
                    }
                }

                FormField {
                    label: "Email",
                    field: Field::Email,
                    value: draft.email.clone(),
                    error: errors.get(Field::Email).to_string(),
                    input_type: "email",
                }
                FormField {
                    label: "Birth Date",
                    field: Field::BirthDate,
                    value: draft.birth_date.clone().unwrap_or_default(),
                    error: errors.get(Field::BirthDate).to_string(),
                    input_type: "date",
                }
                FormField {
                    label: "Cell Phone",
                    field: Field::CellPhone,
                    value: draft.cell_phone.clone().unwrap_or_default(),
                    error: errors.get(Field::CellPhone).to_string(),
                    input_type: "tel",
                    placeholder: "123 456 789",
                }

                div { class: "action-group justify-end",
                    button {
                        class: "btn btn-primary",
                        disabled: edit.saving,
                        onclick: on_save,
                        if edit.saving {
                            Spinner { small: true }
                        } else {
                            "Save"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FormField(
    label: &'static str,
    field: Field,
    value: String,
    error: String,
    #[props(default = "text")] input_type: &'static str,
    #[props(default)] placeholder: &'static str,
) -> Element {
    let mut app_state = use_context::<AppState>();
    let has_error = !error.is_empty();

    rsx! {
        div { class: "form-group",
            label { class: "form-label", "{label}" }
            input {
                class: if has_error { "input input-error" } else { "input" },
                r#type: input_type,
                placeholder: placeholder,
                value: "{value}",
                oninput: move |e| app_state.screen.write().update_field(field, &e.value()),
            }
            if has_error {
                p { class: "form-error", "{error}" }
            }
        }
    }
}
