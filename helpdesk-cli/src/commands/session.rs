use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use client::stores::Session;
use directories::BaseDirs;
use reqwest::cookie::{CookieStore, Jar};
use rpassword::prompt_password;
use shared::models::{Credentials, RegisterRequest, UserType};
use url::Url;

use super::Connection;

/// Session subcommands.
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Sign in and store the session cookies
    Login {
        /// Account email; prompted for when omitted
        #[arg(long, short)]
        email: Option<String>,

        /// Keep the session beyond the browser-session lifetime
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        name: String,

        #[arg(long, short)]
        email: String,

        /// Account type: administrator, supervisor, technician or customer
        #[arg(long)]
        user_type: Option<String>,
    },
    /// Sign out and forget the stored cookies
    Logout,
    /// Show the signed-in user
    Me,
}

pub async fn run(connection: &Connection, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login { email, remember } => login(connection, email, remember).await,
        SessionCommand::Register {
            name,
            email,
            user_type,
        } => register(connection, name, email, user_type).await,
        SessionCommand::Logout => logout(connection).await,
        SessionCommand::Me => me(connection).await,
    }
}

async fn login(connection: &Connection, email: Option<String>, remember: bool) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = prompt_password("Password: ")?;
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }

    let mut credentials = Credentials::new(email, password);
    credentials.remember = remember.then_some(true);

    let store = connection.helpdesk().session();
    let landing = store
        .login(&credentials)
        .await
        .map_err(|err| anyhow::anyhow!(err.message_or("Login failed")))?;
    connection.save()?;
    print_session(&store.snapshot());
    println!("landing page: {landing}");
    Ok(())
}

async fn register(
    connection: &Connection,
    name: String,
    email: String,
    user_type: Option<String>,
) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let confirmation = prompt_password("Confirm password: ")?;
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }
    if password != confirmation {
        bail!("passwords do not match");
    }

    let request = RegisterRequest {
        name,
        email,
        password,
        password_confirmation: confirmation,
        user_type: user_type.map(UserType::from),
    };
    let store = connection.helpdesk().session();
    let landing = store
        .register(&request)
        .await
        .map_err(|err| anyhow::anyhow!(err.message_or("Register failed")))?;
    connection.save()?;
    print_session(&store.snapshot());
    println!("landing page: {landing}");
    Ok(())
}

async fn me(connection: &Connection) -> Result<()> {
    connection.enter(client::Route::Dashboard).await.with_context(|| {
        "no active session found; run `helpdesk session login` first".to_string()
    })?;
    print_session(&connection.helpdesk().session().snapshot());
    Ok(())
}

async fn logout(connection: &Connection) -> Result<()> {
    let store = connection.helpdesk().session();
    let route = store.logout().await;
    if let Some(error) = store.snapshot().error {
        eprintln!("warning: logout request failed: {error}");
    }

    let jar_path = session_path();
    if jar_path.exists() {
        fs::remove_file(&jar_path)
            .with_context(|| format!("failed to remove session jar {}", jar_path.display()))?;
        println!("Removed session cookies at {}", jar_path.display());
    } else {
        println!("No session cookies found at {}", jar_path.display());
    }
    println!("landing page: {route}");
    Ok(())
}

/// Where the cookie jar lives; `HELPDESK_SESSION_FILE` overrides the default
/// under the user's config directory.
pub fn session_path() -> PathBuf {
    if let Some(path) = env::var_os("HELPDESK_SESSION_FILE") {
        return PathBuf::from(path);
    }
    BaseDirs::new().map_or_else(
        || PathBuf::from("./session.cookies"),
        |dirs| dirs.config_dir().join("helpdesk").join("session.cookies"),
    )
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create session directory {}", parent.display()))?;
    }
    Ok(())
}

/// Rebuild a jar from a saved `Cookie` header.
pub fn load_cookie_jar(origin: &Url, path: &Path) -> Result<Arc<Jar>> {
    if !path.exists() {
        bail!("session cookie jar not found at {}", path.display());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session jar {}", path.display()))?;
    let jar = Arc::new(Jar::default());
    for entry in contents.split(';') {
        let cookie = entry.trim();
        if !cookie.is_empty() {
            jar.add_cookie_str(cookie, origin);
        }
    }
    Ok(jar)
}

/// Save the cookies the jar holds for `origin`, readable by the owner only.
/// An empty jar removes the file.
pub fn persist_cookie_jar(jar: &Arc<Jar>, origin: &Url, path: &Path) -> Result<()> {
    if let Some(header) = jar.cookies(origin) {
        ensure_parent(path)?;
        fs::write(path, header.to_str()?.as_bytes())
            .with_context(|| format!("failed to write session jar at {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .context("failed to set session jar permissions")?;
        }
    } else if path.exists() {
        fs::remove_file(path).ok();
    }
    Ok(())
}

fn print_session(session: &Session) {
    let Some(user) = &session.user else {
        println!("Not signed in");
        return;
    };
    println!("Logged in as {}", user.email);
    if !user.name.is_empty() {
        println!("name: {}", user.name);
    }
    println!("user type: {}", user.user_type);
    println!("administrator: {}", if session.is_admin { "yes" } else { "no" });
}
