use aidoku::{alloc::String, imports::defaults::defaults_get};

// settings keys
const USER_AGENT_KEY: &str = "userAgent";

/// Sent with reader page requests when no user agent is configured. The site
/// only serves device-limited chapters to mobile browsers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";

pub fn get_user_agent() -> String {
	user_agent_or_default(defaults_get::<String>(USER_AGENT_KEY))
}

fn user_agent_or_default(value: Option<String>) -> String {
	value
		.map(|ua| String::from(ua.trim()))
		.filter(|ua| !ua.is_empty())
		.unwrap_or_else(|| DEFAULT_USER_AGENT.into())
}

#[cfg(test)]
mod test {
	use super::*;
	use aidoku_test::aidoku_test;

	#[aidoku_test]
	fn blank_user_agent_falls_back() {
		assert_eq!(user_agent_or_default(None), DEFAULT_USER_AGENT);
		assert_eq!(user_agent_or_default(Some("  ".into())), DEFAULT_USER_AGENT);
		assert_eq!(
			user_agent_or_default(Some(" Mozilla/5.0 (iPhone) ".into())),
			"Mozilla/5.0 (iPhone)"
		);
	}
}
