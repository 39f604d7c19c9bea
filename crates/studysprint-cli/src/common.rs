//! Shared bootstrap for command handlers.

use studysprint_core::{ApiClient, Config, CoreError, Database};

/// Everything a command needs: local config and state, plus the
/// backend client built from the configured base URL and timeout.
pub struct Context {
    pub config: Config,
    pub db: Database,
    pub client: ApiClient,
}

pub fn context() -> Result<Context, CoreError> {
    let config = Config::load_or_default();
    let client = ApiClient::new(&config.api.base_url, config.api_timeout())?;
    let db = Database::open()?;
    Ok(Context { config, db, client })
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `mm:ss` countdown display, zero-padded.
pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(3000), "50:00");
    }
}
