//! Counter selection from the serverinfo JSON document

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Counters that can be checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    UpdateCount,
    FreeSpace,
    ShareCount,
    ActiveUsers5Min,
}

impl Counter {
    pub const NAMES: [&'static str; 4] =
        ["update-count", "free-space", "share-count", "active-users-5min"];

    pub fn name(self) -> &'static str {
        match self {
            Counter::UpdateCount => "update-count",
            Counter::FreeSpace => "free-space",
            Counter::ShareCount => "share-count",
            Counter::ActiveUsers5Min => "active-users-5min",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCounter(pub String);

impl FromStr for Counter {
    type Err = UnknownCounter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy names from the older plugin, typo included
        match s {
            "update-count" | "AppUdatesAvailable" => Ok(Counter::UpdateCount),
            "free-space" | "FreeSpace" => Ok(Counter::FreeSpace),
            "share-count" | "NumShares" => Ok(Counter::ShareCount),
            "active-users-5min" | "ActiveUsers5Min" => Ok(Counter::ActiveUsers5Min),
            other => Err(UnknownCounter(other.to_string())),
        }
    }
}

/// Extracted counter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Value(i64),
    /// The counter name was not recognized at extraction time
    Unknown,
}

/// The parts of the serverinfo response this check reads.
///
/// Every level is optional so a missing field can be told apart from a
/// field that is present with value zero.
#[derive(Debug, Default, Deserialize)]
pub struct MetricResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub ocs: Option<Ocs>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ocs {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<OcsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OcsData {
    #[serde(default, deserialize_with = "lenient")]
    pub nextcloud: Option<Nextcloud>,
    #[serde(rename = "activeUsers", default, deserialize_with = "lenient")]
    pub active_users: Option<ActiveUsers>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Nextcloud {
    #[serde(default, deserialize_with = "lenient")]
    pub system: Option<System>,
    #[serde(default, deserialize_with = "lenient")]
    pub shares: Option<Shares>,
}

#[derive(Debug, Default, Deserialize)]
pub struct System {
    #[serde(default, deserialize_with = "lenient")]
    pub freespace: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub apps: Option<Apps>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Apps {
    #[serde(default, deserialize_with = "lenient")]
    pub num_updates_available: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Shares {
    #[serde(default, deserialize_with = "lenient")]
    pub num_shares: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActiveUsers {
    #[serde(default, deserialize_with = "lenient")]
    pub last5minutes: Option<i64>,
}

/// Deserialize a field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl MetricResponse {
    /// Parse a response body, never failing.
    ///
    /// A body that is not JSON at all gives an empty response.
    pub fn parse(body: &str) -> MetricResponse {
        match serde_json::from_str(body) {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Failed to parse response body: {}", e);
                MetricResponse::default()
            }
        }
    }

    fn data(&self) -> Option<&OcsData> {
        self.ocs.as_ref()?.data.as_ref()
    }

    fn system(&self) -> Option<&System> {
        self.data()?.nextcloud.as_ref()?.system.as_ref()
    }

    /// Raw field for a counter, `None` when the document does not carry it
    pub fn field(&self, counter: Counter) -> Option<i64> {
        match counter {
            Counter::UpdateCount => self.system()?.apps.as_ref()?.num_updates_available,
            Counter::FreeSpace => self.system()?.freespace,
            Counter::ShareCount => self.data()?.nextcloud.as_ref()?.shares.as_ref()?.num_shares,
            Counter::ActiveUsers5Min => self.data()?.active_users.as_ref()?.last5minutes,
        }
    }
}

/// Select a counter by name. Missing fields read as zero.
pub fn extract(response: &MetricResponse, name: &str) -> MetricValue {
    match name.parse::<Counter>() {
        Ok(counter) => MetricValue::Value(response.field(counter).unwrap_or(0)),
        Err(UnknownCounter(name)) => {
            log::debug!("No field for counter {}", name);
            MetricValue::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ocs": {
            "meta": {"status": "ok", "statuscode": 200, "message": "OK"},
            "data": {
                "nextcloud": {
                    "system": {
                        "version": "27.1.3.2",
                        "freespace": 48318382080,
                        "cpuload": [0.5, 0.4, 0.3],
                        "apps": {"num_installed": 52, "num_updates_available": 3, "app_updates": []}
                    },
                    "shares": {"num_shares": 17, "num_shares_user": 4}
                },
                "server": {"webserver": "nginx", "php": {"version": "8.2.12"}},
                "activeUsers": {"last5minutes": 2, "last1hour": 5, "last24hours": 11}
            }
        }
    }"#;

    #[test]
    fn test_counter_names() {
        for name in Counter::NAMES {
            assert_eq!(name.parse::<Counter>().unwrap().name(), name);
        }
    }

    #[test]
    fn test_counter_legacy_aliases() {
        assert_eq!("AppUdatesAvailable".parse(), Ok(Counter::UpdateCount));
        assert_eq!("FreeSpace".parse(), Ok(Counter::FreeSpace));
        assert_eq!("NumShares".parse(), Ok(Counter::ShareCount));
        assert_eq!("ActiveUsers5Min".parse(), Ok(Counter::ActiveUsers5Min));
        assert!("freespace".parse::<Counter>().is_err());
    }

    #[test]
    fn test_extract_all_counters() {
        let response = MetricResponse::parse(SAMPLE);
        assert_eq!(extract(&response, "update-count"), MetricValue::Value(3));
        assert_eq!(extract(&response, "free-space"), MetricValue::Value(48_318_382_080));
        assert_eq!(extract(&response, "share-count"), MetricValue::Value(17));
        assert_eq!(extract(&response, "active-users-5min"), MetricValue::Value(2));
    }

    #[test]
    fn test_extract_unknown_name() {
        let response = MetricResponse::parse(SAMPLE);
        assert_eq!(extract(&response, "cpu-load"), MetricValue::Unknown);
    }

    #[test]
    fn test_missing_field_reads_as_zero() {
        let response = MetricResponse::parse(r#"{"ocs": {"data": {"nextcloud": {}}}}"#);
        assert_eq!(response.field(Counter::ShareCount), None);
        assert_eq!(extract(&response, "share-count"), MetricValue::Value(0));
    }

    #[test]
    fn test_present_zero_is_distinct_from_missing() {
        let response =
            MetricResponse::parse(r#"{"ocs": {"data": {"activeUsers": {"last5minutes": 0}}}}"#);
        assert_eq!(response.field(Counter::ActiveUsers5Min), Some(0));
        assert_eq!(response.field(Counter::FreeSpace), None);
    }

    #[test]
    fn test_non_json_body() {
        let response = MetricResponse::parse("<html>maintenance mode</html>");
        assert_eq!(response.field(Counter::FreeSpace), None);
        assert_eq!(extract(&response, "free-space"), MetricValue::Value(0));
    }

    #[test]
    fn test_mistyped_fields_are_skipped() {
        let body = r#"{"ocs": {"data": {
            "nextcloud": {"system": {"freespace": "lots", "apps": {"num_updates_available": 4}}},
            "activeUsers": []
        }}}"#;
        let response = MetricResponse::parse(body);
        assert_eq!(response.field(Counter::FreeSpace), None);
        assert_eq!(response.field(Counter::UpdateCount), Some(4));
        assert_eq!(response.field(Counter::ActiveUsers5Min), None);
    }
}
