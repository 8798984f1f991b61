//! MERIT BADGE PAMPHLET SCRAPER
//! Finds every merit badge listed on scouting.org, looks up the pamphlet PDF on each
//! badge's requirements page and downloads all of them into one folder.

pub mod config;
mod error;
mod macros;
pub mod parse;
pub mod process;
pub mod request;

pub use config::Config;
pub use error::{Error, Result};

const SAVE_FOLDER: &str = "./merit badge downloads";

const SITE_BASE: &str = "https://www.scouting.org";
const ALL_BADGES_PATH: &str = "/skills/merit-badges/all/";
/// Last known WordPress JSON page for the "all merit badges" listing (2025-05-27).
const FALLBACK_LISTING_URL: &str = "https://www.scouting.org/wp-json/wp/v2/pages/175174";

const USER_AGENT_SOURCE: &str = "https://useragentstring.com/pages/Chrome/";
/// Cloudflare rejects requests that don't look like a browser.
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

const PAMPHLET_BASE: &str = "https://filestore.scouting.org/filestore/Merit_Badge_ReqandRes/Pamphlets";

/// Delay before each badge page request, in tenths of a second.
const LOOKUP_DELAY_TENTHS: (u64, u64) = (1, 10);
/// Delay before each pamphlet download, in tenths of a second.
const DOWNLOAD_DELAY_TENTHS: (u64, u64) = (10, 40);
