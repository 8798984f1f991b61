use std::path::PathBuf;

use crate::{
    ALL_BADGES_PATH, DOWNLOAD_DELAY_TENTHS, FALLBACK_LISTING_URL, FALLBACK_USER_AGENT,
    LOOKUP_DELAY_TENTHS, PAMPHLET_BASE, SAVE_FOLDER, SITE_BASE, USER_AGENT_SOURCE,
};

/// Everything a run needs to know about where to fetch from and where to write to.
///
/// `Default` gives the real scouting.org setup. Tests swap the URLs for a mock server
/// and zero out the delays.
#[derive(Debug, Clone)]
pub struct Config {
    pub save_folder: PathBuf,
    /// Scheme + host of the site hosting the badge pages, without a trailing slash.
    pub site_base: String,
    pub all_badges_path: String,
    pub fallback_listing_url: String,
    pub user_agent_source: String,
    pub fallback_user_agent: String,
    /// Prefix the captured pamphlet fragment is appended to.
    pub pamphlet_base: String,
    /// Inclusive range, tenths of a second.
    pub lookup_delay_tenths: (u64, u64),
    /// Inclusive range, tenths of a second.
    pub download_delay_tenths: (u64, u64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_folder: PathBuf::from(SAVE_FOLDER),
            site_base: SITE_BASE.into(),
            all_badges_path: ALL_BADGES_PATH.into(),
            fallback_listing_url: FALLBACK_LISTING_URL.into(),
            user_agent_source: USER_AGENT_SOURCE.into(),
            fallback_user_agent: FALLBACK_USER_AGENT.into(),
            pamphlet_base: PAMPHLET_BASE.into(),
            lookup_delay_tenths: LOOKUP_DELAY_TENTHS,
            download_delay_tenths: DOWNLOAD_DELAY_TENTHS,
        }
    }
}

impl Config {
    pub fn all_badges_url(&self) -> String {
        format!("{}{}", self.site_base, self.all_badges_path)
    }

    pub fn badge_page_url(&self, badge: &str) -> String {
        format!("{}/merit-badges/{badge}/", self.site_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = Config::default();
        assert_eq!(
            config.all_badges_url(),
            "https://www.scouting.org/skills/merit-badges/all/"
        );
        assert_eq!(
            config.badge_page_url("camping"),
            "https://www.scouting.org/merit-badges/camping/"
        );
        assert_eq!(config.save_folder, PathBuf::from("./merit badge downloads"));
    }

    #[test]
    fn test_default_delays() {
        let config = Config::default();
        // 0.1 to 1.0 s before each badge page, 1.0 to 4.0 s before each pamphlet.
        assert_eq!(config.lookup_delay_tenths, (1, 10));
        assert_eq!(config.download_delay_tenths, (10, 40));
    }
}
