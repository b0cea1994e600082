use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
        }
    }
}

/// Automation engine configuration.
///
/// Loaded once at boot and snapshotted per invocation: every auto-run,
/// manual execution, and preview observes exactly one consistent set of
/// flags and thresholds for its whole duration.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// The global kill switch. When off, auto-run performs no reads and no
    /// writes at all.
    pub autorun_enabled: bool,
    /// Invoices must be at least this many days overdue to produce a
    /// proposal.
    pub min_overdue_days: i64,
    /// Tickets must be open without a reply at least this many days.
    pub ticket_threshold_days: i64,
    /// Executor feature flag for invoice reminders.
    pub remind_invoice_enabled: bool,
    /// Executor feature flag for ticket escalation.
    pub escalate_ticket_enabled: bool,
    /// When on, the executor publishes activity events for every branch.
    pub executor_audit: bool,
}

impl AutomationConfig {
    /// Load automation configuration from environment variables.
    ///
    /// | Env Var                              | Default |
    /// |--------------------------------------|---------|
    /// | `AUTOMATION_AUTORUN_ENABLED`         | `false` |
    /// | `AUTOMATION_MIN_OVERDUE_DAYS`        | `3`     |
    /// | `AUTOMATION_TICKET_THRESHOLD_DAYS`   | `3`     |
    /// | `AUTOMATION_REMIND_INVOICE_ENABLED`  | `true`  |
    /// | `AUTOMATION_ESCALATE_TICKET_ENABLED` | `true`  |
    /// | `AUTOMATION_EXECUTOR_AUDIT`          | `true`  |
    pub fn from_env() -> Self {
        Self {
            autorun_enabled: env_flag("AUTOMATION_AUTORUN_ENABLED", false),
            min_overdue_days: env_i64("AUTOMATION_MIN_OVERDUE_DAYS", 3),
            ticket_threshold_days: env_i64("AUTOMATION_TICKET_THRESHOLD_DAYS", 3),
            remind_invoice_enabled: env_flag("AUTOMATION_REMIND_INVOICE_ENABLED", true),
            escalate_ticket_enabled: env_flag("AUTOMATION_ESCALATE_TICKET_ENABLED", true),
            executor_audit: env_flag("AUTOMATION_EXECUTOR_AUDIT", true),
        }
    }
}

/// Read a boolean env var. Accepts `1`/`true`/`yes` (case-insensitive).
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .map(|value| {
            value
                .trim()
                .parse()
                .unwrap_or_else(|_| panic!("{name} must be a valid i64"))
        })
        .unwrap_or(default)
}
