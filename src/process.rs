use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use reqwest::Client;
use tokio::{fs, time::sleep};

use crate::parse::{discover_identifiers, file_name_from_url, find_document, listing_markup};
use crate::request::{locate_listing, polite_delay, resolve_user_agent, Fetcher};
use crate::{info_time, Config, Error, Result};

/// What the discovery phase found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Every badge on the listing, sorted, no duplicates.
    pub badges: Vec<String>,
    /// Pamphlet URLs, in badge order.
    pub documents: Vec<String>,
    /// Badges whose page has no pamphlet link.
    pub no_documents: Vec<String>,
    /// Badges whose page couldn't be fetched.
    pub failed_lookups: Vec<String>,
}

/// What the download phase did with `Discovery::documents`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Downloads {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub discovery: Discovery,
    pub downloads: Downloads,
}

/// Runs the whole job: user agent, listing, pamphlet lookups, downloads.
pub async fn process_site(config: &Config) -> Result<Report> {
    let start_time = Local::now();
    fs::create_dir_all(&config.save_folder).await?;

    let client = Client::new();
    let user_agent = resolve_user_agent(&client, config).await;
    let fetcher = Fetcher::new(client, user_agent);

    let listing_url = locate_listing(&fetcher, config).await?;
    let discovery = discover(&fetcher, config, &listing_url).await?;
    info_time!(
        start_time,
        "Found {} pamphlets for {} merit badges.",
        discovery.documents.len(),
        discovery.badges.len()
    );

    let downloads = download_all(&fetcher, config, &discovery.documents).await;
    info_time!(start_time, "Finished downloading.");

    Ok(Report {
        discovery,
        downloads,
    })
}

/// Fetches the listing and looks up a pamphlet for each badge on it.
///
/// The listing itself must load. A badge page that fails to load is recorded in
/// `failed_lookups` and the rest carry on.
pub async fn discover(fetcher: &Fetcher, config: &Config, listing_url: &str) -> Result<Discovery> {
    let listing = fetcher.get(listing_url).await?.bytes().await?;
    let badges = discover_identifiers(&listing_markup(&listing)?);
    info_time!("Found {} merit badges", badges.len());

    let mut discovery = Discovery {
        badges,
        ..Default::default()
    };
    for badge in &discovery.badges {
        info_time!("Scanning for pamphlet PDF on requirement page for: {badge}");
        match locate_document(fetcher, config, badge).await {
            Ok(Some(url)) => discovery.documents.push(url),
            Ok(None) => discovery.no_documents.push(badge.clone()),
            Err(err) => {
                info_time!("   FAILED {badge}: {err}");
                discovery.failed_lookups.push(badge.clone());
            }
        }
    }
    Ok(discovery)
}

/// Finds the pamphlet URL on one badge's requirements page.
/// Rate-limited so we don't hammer scouting.org.
pub async fn locate_document(
    fetcher: &Fetcher,
    config: &Config,
    badge: &str,
) -> Result<Option<String>> {
    sleep(polite_delay(config.lookup_delay_tenths)).await;

    let page = fetcher.get_text(&config.badge_page_url(badge)).await?;
    let found = find_document(&page, &config.pamphlet_base);
    match &found {
        Some(url) => info_time!("   FOUND: {url}"),
        None => info_time!("   NOT FOUND {badge}."),
    }
    Ok(found)
}

/// Downloads every pamphlet in order, waiting a longer random delay before each one.
/// Failures are recorded and skipped over.
pub async fn download_all(fetcher: &Fetcher, config: &Config, documents: &[String]) -> Downloads {
    let mut downloads = Downloads::default();

    for (i, url) in documents.iter().enumerate() {
        let delay = polite_delay(config.download_delay_tenths);
        sleep(delay).await;
        info_time!(
            "Downloading {}/{}... delay {} url={url}",
            i + 1,
            documents.len(),
            delay.as_secs_f64()
        );

        let file_name = file_name_from_url(url);
        let out_path = config.save_folder.join(&file_name);
        let written = if is_plain_file_name(&file_name) {
            download_document(fetcher, url, &out_path).await
        } else {
            Err(Error::UnsafeFileName(file_name))
        };
        match written {
            Ok(()) => {
                info_time!("file written: {}", out_path.display());
                downloads.downloaded.push(out_path);
            }
            Err(err) => {
                info_time!("an error has occurred while downloading {url}: {err}");
                downloads.failed.push(out_path);
            }
        }
    }
    downloads
}

/// Fetches one pamphlet and writes it to `out_path`, replacing whatever was there.
pub async fn download_document(fetcher: &Fetcher, url: &str, out_path: &Path) -> Result<()> {
    let bytes = fetcher.get_bytes(url).await?;
    fs::write(out_path, bytes).await?;
    Ok(())
}

/// The decoded name must stay a single normal component inside the save folder.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(first)) if first == OsStr::new(name))
        && components.next().is_none()
}

impl Report {
    /// The closing banner printed at the end of a run.
    pub fn summary(&self, save_folder: &Path) -> String {
        let stars = "*".repeat(110);
        let folder = save_folder.display();
        let mut lines = vec![
            stars.clone(),
            format!(
                "***** {} merit badge pamphlets have been downloaded to {folder} *****",
                self.downloads.downloaded.len()
            ),
        ];

        let not_found = &self.discovery.no_documents;
        if !not_found.is_empty() {
            lines.push(format!(
                "***** {} merit badge pamphlets were not found:\n{not_found:?} *****",
                not_found.len()
            ));
        }
        let lookups = &self.discovery.failed_lookups;
        if !lookups.is_empty() {
            lines.push(format!(
                "***** {} merit badge pages could not be loaded:\n{lookups:?} *****",
                lookups.len()
            ));
        }
        let failed = &self.downloads.failed;
        if !failed.is_empty() {
            lines.push(format!(
                "***** {} merit badge pamphlets failed to download to {folder}:\n{failed:?} *****",
                failed.len()
            ));
        }
        lines.push(stars);
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("Camping.pdf"));
        assert!(is_plain_file_name("Fish & Wildlife.pdf"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name("../escape.pdf"));
        assert!(!is_plain_file_name("nested/"));
    }

    #[test]
    fn test_summary_lists_only_nonempty_outcomes() {
        let report = Report {
            discovery: Discovery {
                badges: vec!["camping".into(), "cooking".into()],
                documents: vec!["https://f.test/Camping.pdf".into()],
                no_documents: vec!["cooking".into()],
                failed_lookups: vec![],
            },
            downloads: Downloads {
                downloaded: vec![PathBuf::from("out/Camping.pdf")],
                failed: vec![],
            },
        };
        let summary = report.summary(Path::new("out"));
        assert!(summary.contains("1 merit badge pamphlets have been downloaded to out"));
        assert!(summary.contains("1 merit badge pamphlets were not found:\n[\"cooking\"]"));
        assert!(!summary.contains("failed to download"));
        assert!(!summary.contains("could not be loaded"));
    }

    #[test]
    fn test_summary_lists_failures() {
        let report = Report {
            downloads: Downloads {
                downloaded: vec![],
                failed: vec![PathBuf::from("out/Cooking.pdf")],
            },
            ..Default::default()
        };
        let summary = report.summary(Path::new("out"));
        assert!(summary.contains("0 merit badge pamphlets have been downloaded"));
        assert!(summary.contains("1 merit badge pamphlets failed to download to out"));
        assert!(summary.contains("Cooking.pdf"));
        assert!(!summary.contains("were not found"));
    }
}
