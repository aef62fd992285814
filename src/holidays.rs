/// Holiday calendar: the set of dates on which nobody works
/// Loaded once at startup from a URL or file, optionally refreshed by whole-set swap

use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::HolidayLoadError;

/// Length of a `YYYY-MM-DD` prefix
const DATE_PREFIX_LEN: usize = 10;

/// Immutable set of holiday dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw entries such as `2025-01-01` or `2025-01-01T00:00:00.000Z`.
    /// Only the first 10 characters count; entries that are not dates are skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dates = HashSet::new();
        for entry in entries {
            let entry = entry.as_ref();
            match parse_entry(entry) {
                Some(date) => {
                    dates.insert(date);
                }
                None => warn!("Skipping unparsable holiday entry {:?}", entry),
            }
        }
        Self { dates }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// All holidays as ascending `YYYY-MM-DD` strings
    pub fn sorted(&self) -> Vec<String> {
        let mut dates: Vec<NaiveDate> = self.dates.iter().copied().collect();
        dates.sort_unstable();
        dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
    }
}

fn parse_entry(entry: &str) -> Option<NaiveDate> {
    let prefix = entry.trim().get(..DATE_PREFIX_LEN)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Shared holder of the current calendar snapshot.
/// Readers take an `Arc` and keep it for the whole calculation; writers swap in a new set.
#[derive(Debug, Default)]
pub struct HolidayStore {
    current: RwLock<Arc<HolidayCalendar>>,
}

impl HolidayStore {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self {
            current: RwLock::new(Arc::new(calendar)),
        }
    }

    pub fn snapshot(&self) -> Arc<HolidayCalendar> {
        // A poisoned lock still holds a complete Arc, never a half-written set
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, calendar: HolidayCalendar) {
        let next = Arc::new(calendar);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Where the holiday list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidaySource {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for HolidaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolidaySource::Url(url) => write!(f, "{}", url),
            HolidaySource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Load the full holiday list. The source must be a JSON array of strings.
pub async fn load(source: &HolidaySource, timeout: Duration) -> Result<HolidayCalendar, HolidayLoadError> {
    let entries = match source {
        HolidaySource::Url(url) => fetch_entries(url, timeout).await?,
        HolidaySource::File(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| HolidayLoadError::Read {
                    path: path.clone(),
                    source,
                })?;
            parse_entries(&raw)?
        }
    };

    debug!("Holiday source returned {} entries", entries.len());
    Ok(HolidayCalendar::from_entries(entries))
}

async fn fetch_entries(url: &str, timeout: Duration) -> Result<Vec<String>, HolidayLoadError> {
    let fetch_err = |source: reqwest::Error| HolidayLoadError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;

    let response = client.get(url).send().await.map_err(fetch_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(HolidayLoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(fetch_err)?;
    parse_entries(&body)
}

/// Parse the JSON body of a holiday source
pub fn parse_entries(body: &str) -> Result<Vec<String>, HolidayLoadError> {
    Ok(serde_json::from_str(body)?)
}

/// Reload the holidays every `interval` until cancelled.
/// A failed reload keeps the previous snapshot in place.
pub async fn run_refresh_loop(
    source: HolidaySource,
    fetch_timeout: Duration,
    interval: Duration,
    store: Arc<HolidayStore>,
    cancel_token: CancellationToken,
) {
    info!("Holiday refresh every {}s from {}", interval.as_secs(), source);

    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately; the startup load already covered it
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match load(&source, fetch_timeout).await {
                    Ok(calendar) => {
                        info!("Refreshed {} holidays", calendar.len());
                        store.replace(calendar);
                    }
                    Err(e) => {
                        warn!("Holiday refresh failed, keeping previous list: {}", e);
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                debug!("Holiday refresh loop stopping");
                break;
            }
        }
    }
}
