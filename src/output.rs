//! JSON output for the command-line consumer.
//!
//! Each scraped source becomes one [`Envelope`] on stdout:
//!
//! ```text
//! {"source":"yr","local_date":"2026-10-16","local_time":"07:12:03.120","data":{...}}
//! {"source":"gp","local_date":"2026-10-16","local_time":"07:12:41.877","error":"..."}
//! ```

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use tracing::{error, instrument};

use skrapa::ScrapeError;

/// One source's result, stamped with the local time it finished.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub source: &'static str,
    pub local_date: String,
    pub local_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Wrap a scrape result. Errors are logged and carried as text.
    pub fn from_result<R: Serialize>(
        source: &'static str,
        result: Result<R, ScrapeError>,
    ) -> Result<Self, serde_json::Error> {
        let now = Local::now();
        let (data, error) = match result {
            Ok(records) => (Some(serde_json::to_value(records)?), None),
            Err(e) => {
                error!(source, error = %e, "Scrape failed");
                (None, Some(e.to_string()))
            }
        };
        Ok(Self {
            source,
            local_date: now.date_naive().to_string(),
            local_time: now.time().format("%H:%M:%S%.3f").to_string(),
            data,
            error,
        })
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Print envelopes, one JSON document per line (or pretty-printed).
#[instrument(level = "debug", skip_all, fields(count = envelopes.len()))]
pub fn print(envelopes: &[Envelope], pretty: bool) -> Result<(), Box<dyn Error>> {
    for envelope in envelopes {
        let json = if pretty {
            serde_json::to_string_pretty(envelope)?
        } else {
            serde_json::to_string(envelope)?
        };
        println!("{json}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skrapa::WeatherRecord;

    #[test]
    fn test_success_envelope_has_data_only() {
        let record = WeatherRecord {
            temperature: "3°".to_string(),
            condition: "Regn".to_string(),
            wind: "7 m/s".to_string(),
            precipitation: "4 mm".to_string(),
        };
        let env = Envelope::from_result("klart", Ok(record)).unwrap();
        assert!(!env.is_error());

        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["source"], "klart");
        assert_eq!(json["data"]["Väder"], "Regn");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_has_message_only() {
        let result: Result<WeatherRecord, _> = Err(ScrapeError::Field {
            source_name: "yr",
            field: "wind",
        });
        let env = Envelope::from_result("yr", result).unwrap();
        assert!(env.is_error());

        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["error"], "yr: no rule matched the wind field");
        assert!(json.get("data").is_none());
    }
}
