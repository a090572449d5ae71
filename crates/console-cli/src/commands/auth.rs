//! Authentication commands.

use super::ConsoleContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use std::io::{self, Write};

/// Login with email and password.
pub async fn login(
    ctx: &ConsoleContext,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    if ctx.service.is_logged_in() {
        let who = ctx
            .service
            .current_user()
            .map(|user| user.email)
            .unwrap_or_else(|| "unknown".to_string());
        output::print_success(&format!("Already logged in as {}", who), format);
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;

    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Logging in...");

    match ctx.service.login(&email, &password).await {
        Ok(()) => {
            output::print_success(&format!("Logged in as {}", email), format);
        }
        Err(error) => {
            output::print_error(&format!("Login failed: {}", error), format);
        }
    }

    Ok(())
}

/// Logout and clear the local session.
pub fn logout(ctx: &ConsoleContext, format: &OutputFormat) -> Result<()> {
    ctx.service.logout();
    output::print_success("Logged out", format);
    Ok(())
}

/// Show the current authentication status.
pub fn status(ctx: &ConsoleContext, format: &OutputFormat) -> Result<()> {
    let snapshot = ctx.service.status();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "authenticated": snapshot.authenticated,
                    "state": snapshot.state,
                    "user_id": snapshot.user.as_ref().map(|u| u.id.clone()),
                    "email": snapshot.user.as_ref().map(|u| u.email.clone()),
                    "role": snapshot.user.as_ref().map(|u| u.role.clone()),
                    "expires_at": snapshot.expires_at,
                })
            );
        }
        OutputFormat::Text => {
            if snapshot.authenticated {
                println!("Logged in");
                if let Some(user) = &snapshot.user {
                    output::print_row("Name", &user.name);
                    output::print_row("Email", &user.email);
                    output::print_row("Role", &user.role);
                }
                if let Some(expires_at) = &snapshot.expires_at {
                    output::print_row("Expires", expires_at);
                }
            } else {
                println!("Not logged in");
            }
        }
    }

    Ok(())
}
