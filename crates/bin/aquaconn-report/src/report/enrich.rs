use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use aquaconn_core::site::SiteId;
use aquaconn_fishhealth::client::{Credentials, FishHealthClient};
use aquaconn_fishhealth::error::Result as FishHealthResult;
use aquaconn_fishhealth::models::{LiceSeries, LocalityWeek, TemperatureWeek};

/// The fish-health queries the report needs.
pub(crate) trait FishHealthSource {
    fn sea_temperature(&self, site_id: SiteId, year: i32) -> FishHealthResult<Vec<TemperatureWeek>>;
    fn female_lice(&self, site_id: SiteId, year: i32) -> FishHealthResult<LiceSeries>;
    fn localities(&self, year: i32, week: u32) -> FishHealthResult<Vec<LocalityWeek>>;
}

impl FishHealthSource for FishHealthClient {
    fn sea_temperature(&self, site_id: SiteId, year: i32) -> FishHealthResult<Vec<TemperatureWeek>> {
        FishHealthClient::sea_temperature(self, site_id, year)
    }

    fn female_lice(&self, site_id: SiteId, year: i32) -> FishHealthResult<LiceSeries> {
        FishHealthClient::female_lice(self, site_id, year)
    }

    fn localities(&self, year: i32, week: u32) -> FishHealthResult<Vec<LocalityWeek>> {
        FishHealthClient::localities(self, year, week)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FishHealth {
    pub year: i32,
    pub temperature: Vec<TemperatureWeek>,
    pub lice: LiceSeries,
    /// ISO year and week the fallow status refers to.
    pub status_week: (i32, u32),
    /// Fallow status of each requested site; `None` when the week's list does not have it.
    pub fallow: Vec<(SiteId, Option<bool>)>,
}

impl FishHealth {
    pub fn has_temperature(&self) -> bool {
        self.temperature
            .iter()
            .any(|week| week.sea_temperature.is_some())
    }
}

/// Logs in with the credentials from the environment. Failure leaves the report without
/// fish-health data.
pub(crate) fn connect(notices: &mut Vec<String>) -> Option<FishHealthClient> {
    match Credentials::from_env().and_then(|credentials| FishHealthClient::connect(&credentials)) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Fish-health data is not available: {}", e);
            notices.push(format!("Fish-health data is not available: {}", e));
            None
        }
    }
}

/// Collects the temperature and lice series of `site_id` for `year`, and the fallow status
/// of `sites` in the ISO week of `today`. Each failing query is reported as a notice and
/// leaves its part empty.
pub(crate) fn fish_health<S: FishHealthSource>(
    source: &S,
    site_id: SiteId,
    sites: &[SiteId],
    year: i32,
    today: NaiveDate,
    notices: &mut Vec<String>,
) -> FishHealth {
    let temperature = source
        .sea_temperature(site_id, year)
        .unwrap_or_else(|e| {
            notice(notices, format!("Sea temperature for {} failed: {}", site_id, e));
            Vec::new()
        });
    let lice = source.female_lice(site_id, year).unwrap_or_else(|e| {
        notice(notices, format!("Lice counts for {} failed: {}", site_id, e));
        LiceSeries::default()
    });

    let iso_week = today.iso_week();
    let status_week = (iso_week.year(), iso_week.week());
    let localities = source
        .localities(status_week.0, status_week.1)
        .unwrap_or_else(|e| {
            notice(
                notices,
                format!(
                    "Site status for week {} of {} failed: {}",
                    status_week.1, status_week.0, e
                ),
            );
            Vec::new()
        });
    let fallow = sites
        .iter()
        .map(|site| {
            let status = localities
                .iter()
                .find(|locality| locality.site_id() == *site)
                .map(|locality| locality.is_fallow);
            (*site, status)
        })
        .collect();
    info!(
        "Fish-health data for {}: {} temperature weeks, {} lice weeks, {} localities",
        site_id,
        temperature.len(),
        lice.data.len(),
        localities.len()
    );

    FishHealth {
        year,
        temperature,
        lice,
        status_week,
        fallow,
    }
}

fn notice(notices: &mut Vec<String>, message: String) {
    warn!("{}", message);
    notices.push(message);
}

#[cfg(test)]
mod tests {
    use aquaconn_fishhealth::error::FishHealthError;
    use aquaconn_fishhealth::models::LiceWeek;

    use super::*;

    struct Canned {
        lice_fails: bool,
    }

    impl FishHealthSource for Canned {
        fn sea_temperature(&self, _: SiteId, year: i32) -> FishHealthResult<Vec<TemperatureWeek>> {
            Ok(vec![TemperatureWeek {
                year,
                week: 1,
                sea_temperature: Some(6.5),
            }])
        }

        fn female_lice(&self, _: SiteId, year: i32) -> FishHealthResult<LiceSeries> {
            if self.lice_fails {
                return Err(FishHealthError::MissingEnv("BW_CLIENT_ID"));
            }
            Ok(LiceSeries {
                kind: "avgAdultFemaleLice".to_string(),
                data: vec![LiceWeek {
                    year,
                    week: 1,
                    value: Some(0.1),
                }],
            })
        }

        fn localities(&self, year: i32, week: u32) -> FishHealthResult<Vec<LocalityWeek>> {
            assert_eq!((year, week), (2025, 1));
            Ok(vec![LocalityWeek {
                locality_no: 30560,
                name: "Tristeinen".to_string(),
                is_fallow: true,
            }])
        }
    }

    #[test]
    fn test_fallow_status_uses_iso_week() {
        // 2024-12-30 belongs to week 1 of ISO year 2025.
        let today = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let sites = [SiteId::from(30560), SiteId::from(10)];
        let mut notices = Vec::new();
        let health = fish_health(
            &Canned { lice_fails: false },
            SiteId::from(30560),
            &sites,
            2024,
            today,
            &mut notices,
        );
        assert!(notices.is_empty());
        assert!(health.has_temperature());
        assert_eq!(health.status_week, (2025, 1));
        assert_eq!(
            health.fallow,
            vec![(SiteId::from(30560), Some(true)), (SiteId::from(10), None)]
        );
    }

    #[test]
    fn test_failed_query_becomes_a_notice() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let mut notices = Vec::new();
        let health = fish_health(
            &Canned { lice_fails: true },
            SiteId::from(30560),
            &[],
            2024,
            today,
            &mut notices,
        );
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("Lice counts for 30560 failed"));
        assert!(health.lice.data.is_empty());
        assert_eq!(health.temperature.len(), 1);
    }
}
