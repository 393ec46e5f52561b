use dioxus::prelude::*;
use crate::Route;

#[component]
pub fn NavComponent() -> Element {
    let app_state = use_context::<crate::components::AppState>();
    let session = app_state.session.read();
    let username = session.username().map(str::to_string);
    let provider_login = session.provider_login();
    drop(session);

    rsx! {
        div { class: "min-h-screen flex flex-col",
            nav { class: "nav-bar",
                div { class: "page-container",
                    // Logo section
                    div { class: "nav-logo",
                        div { class: "logo-icon" }
                        span { class: "logo-text", "Recipes" }
                        if provider_login {
                            span { class: "badge badge-google ml-2", "Google" }
                        }
                    }

                    // Navigation links
                    div { class: "nav-links",
                        Link {
                            to: Route::HomeComponent {},
                            class: "nav-link",
                            active_class: "active",
                            "Home"
                        }
                        if let Some(username) = username {
                            Link {
                                to: Route::ProfileComponent { username: username.clone() },
                                class: "nav-link",
                                active_class: "active",
                                "Profile"
                            }
                        }
                    }
                }
            }

            div { class: "fixed-header-spacer" }

            div { class: "flex-1",
                Outlet::<Route> {}
            }
        }
    }
}
