use axum::{
    extract::{DefaultBodyLimit, Extension},
    middleware,
    routing::{get, post},
    Router,
};

mod admin;
mod dialogs;
mod duties;
mod mailing;
mod roles;
mod site;

use super::{auth, state::WebState};

/// Attachments ride through multipart forms, so the admin surface accepts
/// bodies well above axum's default limit.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: WebState) -> Router {
    let admin_routes = Router::new()
        .route("/admin", get(admin::overview))
        .route("/users_base", get(admin::users_base))
        .route("/dialogs", get(dialogs::list))
        .route("/dialog/:chat_id", get(dialogs::dialog))
        .route("/dialog_answer/:chat_id", post(dialogs::answer))
        .route("/dialog_message_file/:message_id", get(dialogs::message_file))
        .route("/mailing", get(mailing::form).post(mailing::start))
        .route("/mailing_status", get(mailing::status))
        .route("/roles_setup", get(roles::list))
        .route("/add_role", post(roles::add))
        .route("/edit_role/:role_id", get(roles::get_one).post(roles::edit))
        .route("/delete_role/:role_id", get(roles::delete))
        .route("/duties_setup", get(duties::list))
        .route("/add_duty", post(duties::add))
        .route("/edit_duty/:duty_id", get(duties::get_one).post(duties::edit))
        .route("/delete_duty/:duty_id", get(duties::delete))
        .route("/access_codes", get(roles::access_codes))
        .route("/role_access_codes/:role_id", get(roles::role_access_codes))
        .route("/add_access_code", post(roles::add_access_code))
        .route("/delete_access_code/:code_id", get(roles::delete_access_code))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/", get(site::index))
        .route("/production", get(site::production))
        .route("/products", get(site::products))
        .route("/favicon.ico", get(site::favicon))
        .route("/static/:name", get(site::static_file))
        .merge(admin_routes)
        .layer(Extension(state))
}
