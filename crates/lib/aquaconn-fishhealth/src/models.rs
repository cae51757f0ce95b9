use serde::Deserialize;

use aquaconn_core::site::SiteId;

#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Weekly sea temperature reported by a locality.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureWeek {
    pub year: i32,
    pub week: u32,
    pub sea_temperature: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TemperatureSeries {
    #[serde(default)]
    pub data: Vec<TemperatureWeek>,
}

/// Weekly average of adult female lice per fish.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LiceWeek {
    pub year: i32,
    pub week: u32,
    pub value: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LiceSeries {
    /// Name of the measure, `avgAdultFemaleLice` for the female lice endpoint.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: Vec<LiceWeek>,
}

/// Status of one locality in a given week.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalityWeek {
    pub locality_no: u64,
    pub name: String,
    #[serde(default)]
    pub is_fallow: bool,
}

impl LocalityWeek {
    pub fn site_id(&self) -> SiteId {
        SiteId::from(self.locality_no)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LocalityWeekList {
    #[serde(default)]
    pub localities: Vec<LocalityWeek>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temperature() {
        let body = r#"{"localityNo":30560,"data":[
            {"year":2023,"week":1,"seaTemperature":6.4},
            {"year":2023,"week":2,"seaTemperature":null}
        ]}"#;
        let series: TemperatureSeries = serde_json::from_str(body).unwrap();
        assert_eq!(series.data.len(), 2);
        assert_eq!(series.data[0].sea_temperature, Some(6.4));
        assert_eq!(series.data[1].sea_temperature, None);
    }

    #[test]
    fn test_parse_lice() {
        let body = r#"{"type":"avgAdultFemaleLice","data":[{"year":2023,"week":12,"value":0.21}]}"#;
        let series: LiceSeries = serde_json::from_str(body).unwrap();
        assert_eq!(series.kind, "avgAdultFemaleLice");
        assert_eq!(series.data[0].week, 12);
    }

    #[test]
    fn test_parse_localities() {
        let body = r#"{"year":2024,"week":18,"localities":[
            {"localityNo":30560,"name":"Tristeinen","isFallow":true,"hasReportedLice":true},
            {"localityNo":12870,"name":"Aukan"}
        ]}"#;
        let list: LocalityWeekList = serde_json::from_str(body).unwrap();
        assert_eq!(list.localities[0].site_id(), SiteId::from(30560));
        assert!(list.localities[0].is_fallow);
        assert!(!list.localities[1].is_fallow);
    }
}
