use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, web, Responder};
use tracing::error;

use siteforge::db;
use siteforge::models::UserCreate;
use siteforge::services::PasswordManager;

use crate::web::forms::{LoginForm, LoginQuery, RegisterForm};
use crate::web::helpers::{is_unique_violation, render, safe_next_target, see_other};
use crate::web::state::AppState;
use crate::web::templates::{LoginTemplate, RegisterTemplate};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_form)
        .service(login_submit)
        .service(logout)
        .service(register_form)
        .service(register_submit);
}

// Argon2id hash of an unused throwaway password, verified when the
// username is unknown so both login paths take comparable time.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=65536,t=3,p=4$dW5rbm93bl9zYWx0X2R1bW15$E2LvWPx3FxvDaJxEMpLLBfWbLkPXfYHrF8z9CGCX3eI";

#[get("/auth/login")]
pub async fn login_form(query: web::Query<LoginQuery>) -> impl Responder {
    render(LoginTemplate {
        error: String::new(),
        next: safe_next_target(query.next.as_deref()).to_string(),
    })
}

#[post("/auth/login")]
pub async fn login_submit(
    state: web::Data<AppState>,
    query: web::Query<LoginQuery>,
    form: web::Form<LoginForm>,
) -> impl Responder {
    let next = safe_next_target(query.next.as_deref()).to_string();
    let username = form.username.trim();

    let user = match db::get_user_by_username(&state.pool, username).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "database error during login");
            return render(LoginTemplate {
                error: "Database error. Please try again.".to_string(),
                next,
            });
        }
    };

    let stored_hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| DUMMY_HASH.to_string());

    let password_valid =
        PasswordManager::verify_password(&form.password, &stored_hash).unwrap_or(false);

    match user {
        Some(user) if password_valid => {
            let cookie = Cookie::build("sf_uid", user.id.to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish();
            let mut resp = see_other(&next);
            if let Err(e) = resp.add_cookie(&cookie) {
                error!(error = %e, "failed to attach session cookie");
            }
            resp
        }
        _ => render(LoginTemplate {
            error: "Invalid username or password".to_string(),
            next,
        }),
    }
}

#[get("/auth/logout")]
pub async fn logout() -> impl Responder {
    let mut removal = Cookie::new("sf_uid", "");
    removal.set_path("/");
    let mut resp = see_other("/auth/login");
    if let Err(e) = resp.add_removal_cookie(&removal) {
        error!(error = %e, "failed to clear session cookie");
    }
    resp
}

#[get("/auth/register")]
pub async fn register_form() -> impl Responder {
    render(RegisterTemplate {
        error: String::new(),
    })
}

#[post("/auth/register")]
pub async fn register_submit(
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> impl Responder {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        return render(RegisterTemplate {
            error: "Username, email and password are all required".to_string(),
        });
    }

    let password_hash = match PasswordManager::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "failed to hash password");
            return render(RegisterTemplate {
                error: "An internal error occurred. Please try again.".to_string(),
            });
        }
    };

    let data = UserCreate {
        username,
        email,
        password_hash,
    };

    match db::create_user(&state.pool, &data).await {
        Ok(Some(_)) => see_other("/auth/login"),
        Ok(None) => render(RegisterTemplate {
            error: "That username is already taken".to_string(),
        }),
        Err(e) if is_unique_violation(&e) => render(RegisterTemplate {
            error: "That email address is already registered".to_string(),
        }),
        Err(e) => {
            error!(error = %e, "database error during registration");
            render(RegisterTemplate {
                error: "Database error. Please try again.".to_string(),
            })
        }
    }
}
