//! Accounts API: registration, email verification, JWT, passwords, profile
//!
//! Mounted under `/accounts/api/V1`.

mod password;
mod profile;
mod registration;
mod token;

pub(crate) use profile::load_profile_view;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{login_rate_limit, password_reset_rate_limit, register_rate_limit};
use crate::state::AppState;

pub const PREFIX: &str = "/accounts/api/V1";

pub const REGISTRATION_EMAIL_SENT: &str =
    "ایمیل ارسال شد. لطفاً ایمیل خود را برای تأیید حساب بررسی کنید.";
pub const ALREADY_VERIFIED: &str = "حساب شما قبلاً تأیید شده است.";
pub const VERIFICATION_RESENT: &str = "ایمیل تأیید مجدداً ارسال شد.";
pub const PASSWORD_CHANGED: &str = "رمز عبور با موفقیت تغییر کرد.";
pub const RESET_LINK_SENT: &str = "لینک بازیابی رمز عبور به ایمیل شما ارسال شد.";
pub const PASSWORD_RESET_DONE: &str = "رمز عبور با موفقیت بازنشانی شد.";

pub fn router(state: &AppState) -> Router<AppState> {
    let registration = Router::new()
        .route("/registration/", post(registration::register))
        .route("/resend/", post(registration::resend))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let login = Router::new()
        .route("/jwt/create/", post(token::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let reset = Router::new()
        .route("/reset-password/", post(password::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            password_reset_rate_limit,
        ));

    let routes = Router::new()
        .route("/is-verified/{token}/", get(registration::is_verified))
        .route("/jwt/refresh/", post(token::refresh))
        .route("/jwt/verify/", post(token::verify))
        .route("/change-password/", post(password::change_password))
        .route(
            "/reset-password-confirm/{token}/",
            post(password::reset_password_confirm),
        )
        .route(
            "/profile/",
            get(profile::get_profile)
                .put(profile::update_profile)
                .patch(profile::update_profile),
        )
        .merge(registration)
        .merge(login)
        .merge(reset);

    Router::new().nest(PREFIX, routes)
}
