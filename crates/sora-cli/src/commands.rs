//! CLI command implementations.

use crate::app::AppContext;
use crate::output::{self, OutputFormat};
use anyhow::Context as _;
use serde_json::json;
use sora_auth::guard;
use sora_i18n::Locale;
use sora_theme::ThemeMode;
use std::io::{self, Write};

/// Sign in. Prompts for the handle when not given; the app password is
/// always read without echo.
pub async fn login(
    ctx: &AppContext,
    server: Option<&str>,
    handle: Option<&str>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let server = server
        .map(str::to_string)
        .unwrap_or_else(|| ctx.config.service_url.clone());

    let handle = match handle {
        Some(handle) => handle.to_string(),
        None => {
            print!("{}: ", ctx.translator.translate("login.handle"));
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };
    if handle.is_empty() {
        anyhow::bail!("Handle is required");
    }

    let prompt = format!("{}: ", ctx.translator.translate("login.password"));
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        anyhow::bail!("App password is required");
    }

    if ctx.session.login(&server, &handle, &password).await {
        let snapshot = ctx.session.snapshot();
        let did = snapshot
            .session
            .map(|s| s.did)
            .unwrap_or_default();
        output::print_success(&format!("Logged in as {handle} ({did})"), format);
        Ok(())
    } else {
        let message = ctx
            .session
            .snapshot()
            .last_error
            .unwrap_or_else(|| ctx.translator.translate("auth.error.unknown"));
        output::print_error(&message, format);
        std::process::exit(1);
    }
}

/// Sign out of the active account.
pub async fn logout(ctx: &AppContext, format: &OutputFormat) -> anyhow::Result<()> {
    ctx.session.logout();
    output::print_success("Logged out", format);
    Ok(())
}

/// Show session state and the derived route.
pub async fn status(ctx: &AppContext, format: &OutputFormat) -> anyhow::Result<()> {
    let snapshot = ctx.session.snapshot();
    let route = guard::decide_from_snapshot(&snapshot);

    match format {
        OutputFormat::Json => {
            let value = json!({
                "authenticated": snapshot.authenticated,
                "initialized": snapshot.initialized,
                "route": format!("{route:?}").to_lowercase(),
                "did": snapshot.session.as_ref().map(|s| s.did.clone()),
                "handle": snapshot.session.as_ref().map(|s| s.handle.clone()),
                "expires_at": snapshot.session.as_ref().map(|s| s.expires_at.to_rfc3339()),
                "last_error": snapshot.last_error,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            output::print_heading("Session");
            output::print_row(
                "Status",
                if snapshot.authenticated {
                    "logged in"
                } else {
                    "not logged in"
                },
            );
            if let Some(session) = &snapshot.session {
                output::print_row("Handle", &session.handle);
                output::print_row("DID", &session.did);
                output::print_row("Server", &session.service_url);
                output::print_row("Expires", &session.expires_at.to_rfc3339());
            }
            if let Some(user) = &snapshot.user {
                if let Some(name) = &user.display_name {
                    output::print_row("Name", name);
                }
            }
            if let Some(error) = &snapshot.last_error {
                output::print_row("Last error", error);
            }
            output::print_row("Route", &format!("{route:?}").to_lowercase());
        }
    }
    Ok(())
}

/// List stored accounts.
pub async fn accounts(ctx: &AppContext, format: &OutputFormat) -> anyhow::Result<()> {
    let accounts = ctx
        .db
        .lock()
        .unwrap()
        .list_accounts()
        .context("listing accounts")?;

    match format {
        OutputFormat::Json => {
            let value: Vec<_> = accounts
                .iter()
                .map(|a| {
                    json!({
                        "handle": a.handle,
                        "did": a.did,
                        "service_url": a.service_url,
                        "is_active": a.is_active,
                        "session_expires_at": a.session_expires_at.to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if accounts.is_empty() {
                println!("No stored accounts.");
                return Ok(());
            }
            output::print_heading("Accounts");
            for account in accounts {
                let marker = if account.is_active { "*" } else { " " };
                println!("{} {}  {}", marker, account.handle, account.did);
            }
        }
    }
    Ok(())
}

/// Switch the active account.
pub async fn switch(ctx: &AppContext, did: &str, format: &OutputFormat) -> anyhow::Result<()> {
    if ctx.session.switch_account(did).await {
        output::print_success(&format!("Switched to {did}"), format);
        Ok(())
    } else {
        let message = ctx
            .session
            .snapshot()
            .last_error
            .unwrap_or_else(|| format!("No account {did}"));
        output::print_error(&message, format);
        std::process::exit(1);
    }
}

/// Show current settings.
pub async fn settings_show(ctx: &AppContext, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "locale": ctx.settings.locale.as_str(),
                "theme_mode": ctx.settings.theme_mode.as_str(),
                "version": ctx.settings.version,
                "settings_file": ctx.paths.settings_file(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            output::print_heading(&ctx.translator.translate("settings.title"));
            output::print_row("Locale", ctx.settings.locale.native_name());
            output::print_row("Theme", ctx.settings.theme_mode.as_str());
            output::print_row("Version", &ctx.settings.version);
            output::print_row("File", &ctx.paths.settings_file().display().to_string());
        }
    }
    Ok(())
}

/// Change the UI locale.
pub async fn settings_locale(
    ctx: &mut AppContext,
    tag: &str,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let locale = Locale::from_tag(tag);
    ctx.settings_manager
        .update_locale(locale)
        .context("saving settings")?;
    output::print_success(&format!("Locale set to {}", locale.as_str()), format);
    Ok(())
}

/// Change the theme mode.
pub async fn settings_theme(
    ctx: &mut AppContext,
    mode: &str,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mode = ThemeMode::from_str(mode);
    ctx.settings_manager
        .update_theme_mode(mode)
        .context("saving settings")?;
    ctx.theme.set_mode(mode);
    output::print_success(&format!("Theme set to {}", mode.as_str()), format);
    Ok(())
}

/// Reset settings to OS-derived defaults.
pub async fn settings_reset(ctx: &mut AppContext, format: &OutputFormat) -> anyhow::Result<()> {
    let defaults = ctx.settings_manager.reset().context("resetting settings")?;
    ctx.theme.set_mode(defaults.theme_mode);
    ctx.settings = defaults;
    output::print_success("Settings reset to defaults", format);
    Ok(())
}
