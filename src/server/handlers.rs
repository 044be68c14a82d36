// src/server/handlers.rs

use anyhow::Result;
use bytes::BufMut;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::{
    http::{header, StatusCode, Uri},
    multipart::FormData,
    reply::Response,
    Rejection, Reply,
};

use super::{pages, AppState, SESSION_COOKIE};
use crate::auth::Registration;
use crate::dataset::UploadError;
use crate::report::{self, DashboardQuery};

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: Option<String>,
}

fn see_other(location: &'static str) -> Response {
    warp::redirect::see_other(Uri::from_static(location)).into_response()
}

fn redirect_to_login() -> Response {
    see_other("/login")
}

fn internal_error(what: &str, err: anyhow::Error) -> Response {
    error!("{} failed: {:#}", what, err);
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: format!("{} failed", what),
            details: Some(format!("{:#}", err)),
        }),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response()
}

/// Run file-bound work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

pub async fn health() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "coursecast"
    })))
}

pub async fn login(form: CredentialsForm, state: AppState) -> Result<Response, Rejection> {
    match state.credentials.verify(&form.username, &form.password) {
        Ok(true) => {
            let token = state.sessions.create(&form.username);
            info!(user = %form.username, "logged in");
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
            Ok(warp::reply::with_header(
                warp::redirect::see_other(Uri::from_static("/home")),
                header::SET_COOKIE,
                cookie,
            )
            .into_response())
        }
        Ok(false) => {
            info!(user = %form.username, "rejected login");
            Ok(see_other("/login?flash=invalid_login"))
        }
        Err(e) => Ok(internal_error("verifying credentials", e)),
    }
}

pub async fn register(form: CredentialsForm, state: AppState) -> Result<Response, Rejection> {
    match state.credentials.register(&form.username, &form.password) {
        Ok(Registration::Created) => Ok(see_other("/login?flash=registered")),
        Ok(Registration::AlreadyExists) => Ok(see_other("/register?flash=user_exists")),
        Err(e) => Ok(internal_error("registering account", e)),
    }
}

pub async fn logout(token: Option<String>, state: AppState) -> Result<Response, Rejection> {
    if let Some(token) = token {
        state.sessions.remove(&token);
    }
    let expired = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    Ok(warp::reply::with_header(
        warp::redirect::see_other(Uri::from_static("/login")),
        header::SET_COOKIE,
        expired,
    )
    .into_response())
}

pub async fn home(user: Option<String>, q: pages::FlashQuery) -> Result<Response, Rejection> {
    match user {
        Some(user) => Ok(pages::home(&user, q).into_response()),
        None => Ok(redirect_to_login()),
    }
}

pub async fn predict(user: Option<String>, state: AppState) -> Result<Response, Rejection> {
    if user.is_none() {
        return Ok(redirect_to_login());
    }
    let repo = Arc::clone(&state.dataset);
    match run_blocking(move || report::build_forecast_report(&*repo)).await {
        Ok(report) => Ok(warp::reply::json(&report).into_response()),
        Err(e) => Ok(internal_error("forecast report", e)),
    }
}

pub async fn dashboard(
    user: Option<String>,
    query: DashboardQuery,
    state: AppState,
) -> Result<Response, Rejection> {
    if user.is_none() {
        return Ok(redirect_to_login());
    }
    let repo = Arc::clone(&state.dataset);
    match run_blocking(move || report::build_dashboard(&*repo, &query)).await {
        Ok(report) => Ok(warp::reply::json(&report).into_response()),
        Err(e) => Ok(internal_error("dashboard report", e)),
    }
}

pub async fn upload(
    user: Option<String>,
    form: FormData,
    state: AppState,
) -> Result<Response, Rejection> {
    let Some(user) = user else {
        return Ok(redirect_to_login());
    };

    let (file_name, contents) = match read_file_field(form).await {
        Ok(Some(file)) => file,
        Ok(None) => return Ok(see_other("/home?flash=no_file")),
        Err(e) => {
            warn!(user = %user, "unreadable multipart upload: {:#}", e);
            return Ok(see_other("/home?flash=upload_failed"));
        }
    };

    let repo = Arc::clone(&state.dataset);
    let name = file_name.clone();
    match run_blocking(move || repo.append_csv(&name, &contents)).await {
        Ok(summary) => {
            info!(
                user = %user,
                file = %file_name,
                rows = summary.rows_appended,
                total = summary.total_rows,
                "upload accepted"
            );
            Ok(see_other("/home?flash=uploaded"))
        }
        Err(e) => match e.downcast_ref::<UploadError>() {
            Some(UploadError::NotCsv(_)) => Ok(see_other("/home?flash=not_csv")),
            Some(UploadError::Invalid(reason)) => {
                warn!(user = %user, file = %file_name, "rejected upload: {}", reason);
                Ok(see_other("/home?flash=upload_failed"))
            }
            None => Ok(internal_error("upload", e)),
        },
    }
}

/// Pull the `file` field out of a multipart body as (file name, bytes).
///
/// Parts are consumed in order; each body is drained before the next part is pulled.
async fn read_file_field(mut form: FormData) -> Result<Option<(String, Vec<u8>)>> {
    while let Some(part) = form.try_next().await? {
        if part.name() != "file" {
            continue;
        }
        let file_name = part.filename().unwrap_or_default().to_string();
        let contents = part
            .stream()
            .try_fold(Vec::new(), |mut buf, chunk| {
                buf.put(chunk);
                async move { Ok(buf) }
            })
            .await?;
        return Ok(Some((file_name, contents)));
    }
    Ok(None)
}
