use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::warn;

use moneta_core::models::{NewUser, Preferences, User};

use super::AppContext;
use crate::output::print_json;

/// Read by `login` and `register` instead of prompting, for scripts
const PASSWORD_ENV: &str = "MONETA_PASSWORD";

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_username {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

fn prompt_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    Ok(rpassword::prompt_password(prompt)?)
}

pub async fn login(ctx: &mut AppContext, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_username(ctx.config.last_username.as_deref())?,
    };
    if username.is_empty() {
        bail!("Username is required");
    }
    let password = prompt_password("Password: ")?;
    if password.is_empty() {
        bail!("Password is required");
    }

    println!("Authenticating...");
    ctx.client.login(&username, &password).await?;

    ctx.config.last_username = Some(username.clone());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}", username);
    Ok(())
}

pub async fn register(
    ctx: &mut AppContext,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let password_confirm = if std::env::var(PASSWORD_ENV).is_ok() {
        password.clone()
    } else {
        prompt_password("Confirm password: ")?
    };

    let user = NewUser {
        username,
        email,
        first_name,
        last_name,
        password,
        password_confirm,
    };
    let created = ctx.client.register(&user).await?;

    println!(
        "Registered {} <{}>. Run `moneta login {}` to sign in.",
        created.username, created.email, created.username
    );
    Ok(())
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    if !ctx.client.credentials().is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    ctx.client.logout()?;
    Ok(())
}

fn print_user(user: &User) {
    println!("{} ({})", user.display_name(), user.username);
    if !user.email.is_empty() {
        println!("  E-mail:        {}", user.email);
    }
    if !user.phone.is_empty() {
        println!("  Phone:         {}", user.phone);
    }
    match user.pro_expires_at {
        Some(expires) if user.is_pro => {
            println!("  Plan:          {} (until {})", user.plan, expires.format("%d/%m/%Y"))
        }
        _ => println!("  Plan:          {}", user.plan),
    }
    println!("  Dark mode:     {}", if user.dark_mode { "on" } else { "off" });
    println!(
        "  Notifications: {}",
        if user.notifications_enabled { "on" } else { "off" }
    );
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.client.me().await?;
    if ctx.json {
        return print_json(&user);
    }
    print_user(&user);
    Ok(())
}

/// Local state only; no request is made
pub fn status(ctx: &AppContext) -> Result<()> {
    let credentials = ctx.client.credentials();
    println!("API:           {}", ctx.client.base_url());
    println!("Token storage: {}", ctx.storage_kind);
    println!("Session:       {}", credentials.session_state());
    println!(
        "Refresh token: {}",
        if credentials.refresh_token().is_some() { "present" } else { "none" }
    );
    if let Some(ref username) = ctx.config.last_username {
        println!("Last user:     {}", username);
    }
    Ok(())
}

pub async fn update_preferences(ctx: &AppContext, preferences: &Preferences) -> Result<()> {
    let user = ctx.client.update_preferences(preferences).await?;
    if ctx.json {
        return print_json(&user);
    }
    println!("Preferences updated");
    print_user(&user);
    Ok(())
}
