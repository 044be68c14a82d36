// src/server/mod.rs

pub mod handlers;
pub mod pages;

use anyhow::Result;
use std::{convert::Infallible, sync::Arc};
use tracing::info;
use warp::{http::Uri, Filter, Rejection, Reply};

use crate::auth::{CredentialStore, InMemorySessionStore, JsonCredentialStore, SessionStore};
use crate::config::Config;
use crate::dataset::{CsvDatasetRepository, DatasetRepository};
use crate::report::DashboardQuery;

pub const SESSION_COOKIE: &str = "session";

const FORM_LIMIT: u64 = 16 * 1024;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<dyn DatasetRepository>,
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub max_upload_bytes: u64,
}

impl AppState {
    /// File-backed dataset and users, in-memory sessions.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let dataset = CsvDatasetRepository::new(&cfg.data_dir, &cfg.master_file)?;
        Ok(Self {
            dataset: Arc::new(dataset),
            credentials: Arc::new(JsonCredentialStore::new(&cfg.users_file)),
            sessions: Arc::new(InMemorySessionStore::new(cfg.session_ttl()?)),
            max_upload_bytes: cfg.max_upload_bytes,
        })
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Resolve the session cookie to the logged-in user, if any.
fn with_user(
    state: AppState,
) -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE)
        .map(move |token: Option<String>| token.and_then(|t| state.sessions.lookup(&t)))
}

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::get()
        .and(warp::path::end())
        .map(|| warp::redirect::see_other(Uri::from_static("/login")));

    let health = warp::get()
        .and(warp::path!("health"))
        .and_then(handlers::health);

    let login_page = warp::get()
        .and(warp::path!("login"))
        .and(warp::query::<pages::FlashQuery>())
        .map(pages::login);

    let login = warp::post()
        .and(warp::path!("login"))
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form::<handlers::CredentialsForm>())
        .and(with_state(state.clone()))
        .and_then(handlers::login);

    let register_page = warp::get()
        .and(warp::path!("register"))
        .and(warp::query::<pages::FlashQuery>())
        .map(pages::register);

    let register = warp::post()
        .and(warp::path!("register"))
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form::<handlers::CredentialsForm>())
        .and(with_state(state.clone()))
        .and_then(handlers::register);

    let home = warp::get()
        .and(warp::path!("home"))
        .and(with_user(state.clone()))
        .and(warp::query::<pages::FlashQuery>())
        .and_then(handlers::home);

    let upload = warp::post()
        .and(warp::path!("upload"))
        .and(with_user(state.clone()))
        .and(warp::multipart::form().max_length(state.max_upload_bytes))
        .and(with_state(state.clone()))
        .and_then(handlers::upload);

    let predict = warp::get()
        .and(warp::path!("predict"))
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::predict);

    let dashboard = warp::get()
        .and(warp::path!("dashboard"))
        .and(with_user(state.clone()))
        .and(warp::query::<DashboardQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::dashboard);

    let logout = warp::get()
        .and(warp::path!("logout"))
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .and(with_state(state))
        .and_then(handlers::logout);

    index
        .or(health)
        .or(login_page)
        .or(login)
        .or(register_page)
        .or(register)
        .or(home)
        .or(upload)
        .or(predict)
        .or(dashboard)
        .or(logout)
        .with(warp::trace::request())
}

/// Serve until the process is stopped.
pub async fn serve(cfg: &Config) -> Result<()> {
    let addr = cfg.socket_addr()?;
    let state = AppState::from_config(cfg)?;
    info!(%addr, data_dir = %cfg.data_dir.display(), "coursecast listening");
    warp::serve(routes(state)).run(addr).await;
    Ok(())
}
