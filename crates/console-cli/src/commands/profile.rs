//! Profile command.

use super::ConsoleContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use console_auth::Access;

/// Fetch and display the logged-in user's profile.
///
/// Guarded like any protected view: without an administrative session the
/// command denies and points at login instead of calling the backend.
pub async fn profile(ctx: &ConsoleContext, format: &OutputFormat) -> Result<()> {
    if let Access::Denied { redirect } = ctx.service.require_admin() {
        output::print_error(
            &format!("Not authorized. Log in first (`examdesk login`, route {})", redirect),
            format,
        );
        return Ok(());
    }

    match ctx.service.fetch_profile().await {
        Ok(user) => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            OutputFormat::Text => {
                println!("Profile");
                output::print_row("Name", &user.name);
                output::print_row("Email", &user.email);
                output::print_row("Role", &user.role);
                if let Some(birth) = &user.birth {
                    output::print_row("Birth", birth);
                }
                if let Some(citizen_id) = &user.citizen_id {
                    output::print_row("Citizen ID", citizen_id);
                }
                if let Some(phone_number) = &user.phone_number {
                    output::print_row("Phone", phone_number);
                }
                if let Some(address) = &user.address {
                    output::print_row("Address", address);
                }
            }
        },
        Err(error) => {
            output::print_error(&format!("Failed to fetch profile: {}", error), format);
        }
    }

    Ok(())
}
