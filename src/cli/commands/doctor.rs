//! Doctor command - verify configuration before first use.

use crate::cli::Output;
use crate::config::{Settings, API_KEY_VAR};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lektor Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    println!("{}", style("Directories").bold());
    let upload_check = check_upload_dir(settings);
    upload_check.print();
    checks.push(upload_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Lektor.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Lektor is ready to use.");
    }

    Ok(())
}

/// Check if the Gemini API key is configured.
fn check_api_key() -> CheckResult {
    let _ = dotenvy::dotenv();

    match std::env::var(API_KEY_VAR) {
        Ok(key) if key.len() > 12 => {
            let masked = format!("{}...{}", &key[..4], &key[key.len() - 4..]);
            CheckResult::ok(API_KEY_VAR, &format!("configured ({})", masked))
        }
        Ok(key) if !key.is_empty() => {
            CheckResult::warning(
                API_KEY_VAR,
                "set but looks too short",
                "Double-check the key in your .env file",
            )
        }
        _ => CheckResult::error(
            API_KEY_VAR,
            "not set",
            &format!("Add {}='...' to your environment or a .env file", API_KEY_VAR),
        ),
    }
}

/// Check the upload directory.
fn check_upload_dir(settings: &Settings) -> CheckResult {
    let upload_dir = settings.upload_dir();
    if upload_dir.exists() {
        CheckResult::ok("Upload directory", &format!("{}", upload_dir.display()))
    } else {
        CheckResult::warning(
            "Upload directory",
            &format!("{} (will be created)", upload_dir.display()),
            "Directory will be created on first upload",
        )
    }
}

/// Check if the config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create one at {}", config_path.display()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_check_upload_dir_missing_is_warning() {
        let mut settings = Settings::default();
        settings.general.upload_dir = "/nonexistent/lektor-test-dir".to_string();
        let result = check_upload_dir(&settings);
        assert_eq!(result.status, CheckStatus::Warning);
    }
}
