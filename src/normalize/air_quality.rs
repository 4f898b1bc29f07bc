use super::format_timestamp;
use crate::models::{AirQualityResponse, AqiCategory, NormalizedAirQualityRecord, RawAirQualityRecord};
use std::collections::BTreeMap;

/// The closed set of pollutant codes the air pollution API reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Co,
    No,
    No2,
    O3,
    So2,
    Pm2_5,
    Pm10,
    Nh3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 8] = [
        Pollutant::Co,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Pm2_5,
        Pollutant::Pm10,
        Pollutant::Nh3,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "co" => Some(Pollutant::Co),
            "no" => Some(Pollutant::No),
            "no2" => Some(Pollutant::No2),
            "o3" => Some(Pollutant::O3),
            "so2" => Some(Pollutant::So2),
            "pm2_5" => Some(Pollutant::Pm2_5),
            "pm10" => Some(Pollutant::Pm10),
            "nh3" => Some(Pollutant::Nh3),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Nh3 => "nh3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Co => "Carbon Monoxide (CO)",
            Pollutant::No => "Nitric oxide (NO)",
            Pollutant::No2 => "Nitrogen dioxide (NO2)",
            Pollutant::O3 => "Ozone (O3)",
            Pollutant::So2 => "Sulfur dioxide (SO2)",
            Pollutant::Pm2_5 => "Particulate Matter (PM2.5)",
            Pollutant::Pm10 => "Particulate Matter (PM10)",
            Pollutant::Nh3 => "Ammonia (NH3)",
        }
    }
}

/// Display label for a pollutant code; unknown codes are returned unchanged.
pub fn pollutant_label(code: &str) -> &str {
    Pollutant::from_code(code).map_or(code, |p| p.label())
}

/// Maps an air quality index onto its category.
///
/// The rule is an interval chain over the index, not a lookup of the five
/// integer values: `<= 1` Good, `(1, 2]` Fair, `(2, 3]` Moderate, `(3, 4]` Poor,
/// `>= 5` Very Poor. Anything the chain does not cover (the gap `(4, 5)`, NaN)
/// is Unknown.
pub fn describe_aqi(index: f64) -> AqiCategory {
    if index <= 1.0 {
        AqiCategory::Good
    } else if index > 1.0 && index <= 2.0 {
        AqiCategory::Fair
    } else if index > 2.0 && index <= 3.0 {
        AqiCategory::Moderate
    } else if index > 3.0 && index <= 4.0 {
        AqiCategory::Poor
    } else if index >= 5.0 {
        AqiCategory::VeryPoor
    } else {
        AqiCategory::Unknown
    }
}

/// Normalizes one raw reading.
pub fn normalize_air_quality_record(raw: &RawAirQualityRecord) -> NormalizedAirQualityRecord {
    let components: BTreeMap<String, f64> = raw
        .components
        .iter()
        .map(|(code, value)| (pollutant_label(code).to_string(), *value))
        .collect();

    NormalizedAirQualityRecord {
        date_time: format_timestamp(raw.dt),
        air_quality_index: raw.main.aqi,
        air_quality_description: describe_aqi(f64::from(raw.main.aqi)),
        components,
    }
}

/// Normalizes a sequence of raw readings, preserving order one-to-one.
pub fn normalize_air_quality(records: &[RawAirQualityRecord]) -> Vec<NormalizedAirQualityRecord> {
    records.iter().map(normalize_air_quality_record).collect()
}

/// Extracts the record list of an air pollution payload.
///
/// A missing payload or a payload without `list` yields an empty sequence.
pub fn air_quality_records(payload: Option<AirQualityResponse>) -> Vec<RawAirQualityRecord> {
    payload.and_then(|p| p.list).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAqi;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::HashSet;

    fn raw(dt: i64, aqi: u8, components: &[(&str, f64)]) -> RawAirQualityRecord {
        RawAirQualityRecord {
            dt,
            main: RawAqi { aqi },
            components: components
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    #[rstest]
    #[case(0.0, AqiCategory::Good)]
    #[case(1.0, AqiCategory::Good)]
    #[case(1.5, AqiCategory::Fair)]
    #[case(2.0, AqiCategory::Fair)]
    #[case(3.0, AqiCategory::Moderate)]
    #[case(4.0, AqiCategory::Poor)]
    #[case(4.5, AqiCategory::Unknown)]
    #[case(5.0, AqiCategory::VeryPoor)]
    #[case(7.0, AqiCategory::VeryPoor)]
    #[case(f64::NAN, AqiCategory::Unknown)]
    fn aqi_interval_boundaries(#[case] index: f64, #[case] expected: AqiCategory) {
        assert_eq!(describe_aqi(index), expected);
    }

    #[rstest]
    #[case("co", "Carbon Monoxide (CO)")]
    #[case("no", "Nitric oxide (NO)")]
    #[case("no2", "Nitrogen dioxide (NO2)")]
    #[case("o3", "Ozone (O3)")]
    #[case("so2", "Sulfur dioxide (SO2)")]
    #[case("pm2_5", "Particulate Matter (PM2.5)")]
    #[case("pm10", "Particulate Matter (PM10)")]
    #[case("nh3", "Ammonia (NH3)")]
    fn pollutant_code_maps_to_label(#[case] code: &str, #[case] label: &str) {
        assert_eq!(pollutant_label(code), label);
    }

    #[test]
    fn every_pollutant_code_has_a_distinct_label() {
        let labels: HashSet<&str> = Pollutant::ALL.iter().map(|p| pollutant_label(p.code())).collect();
        assert_eq!(labels.len(), Pollutant::ALL.len());
    }

    #[test]
    fn unknown_pollutant_code_passes_through() {
        assert_eq!(pollutant_label("xx"), "xx");
        let record = normalize_air_quality_record(&raw(0, 1, &[("xx", 1.25)]));
        assert_eq!(record.components.get("xx"), Some(&1.25));
    }

    #[test]
    fn normalized_record_has_fixed_schema() {
        let record = normalize_air_quality_record(&raw(
            1_606_223_802,
            3,
            &[("co", 201.94), ("no2", 0.77), ("pm2_5", 0.5)],
        ));
        let value = serde_json::to_value(&record).unwrap();
        let keys: HashSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            HashSet::from([
                "dateTime",
                "airQualityIndex",
                "airQualityDescription",
                "components"
            ])
        );
        assert_eq!(value["dateTime"], json!("2020-11-24 13:16:42"));
        assert_eq!(value["airQualityIndex"], json!(3));
        assert_eq!(value["airQualityDescription"], json!("Moderate"));
        assert_eq!(
            value["components"],
            json!({
                "Carbon Monoxide (CO)": 201.94,
                "Nitrogen dioxide (NO2)": 0.77,
                "Particulate Matter (PM2.5)": 0.5
            })
        );
    }

    #[test]
    fn normalization_preserves_order() {
        let records = vec![raw(300, 1, &[]), raw(100, 5, &[]), raw(200, 2, &[])];
        let normalized = normalize_air_quality(&records);
        let times: Vec<&str> = normalized.iter().map(|r| r.date_time.as_str()).collect();
        assert_eq!(
            times,
            vec!["1970-01-01 00:05:00", "1970-01-01 00:01:40", "1970-01-01 00:03:20"]
        );
        assert_eq!(normalized[1].air_quality_description, AqiCategory::VeryPoor);
    }

    #[test]
    fn absent_payload_or_list_yields_no_records() {
        assert!(air_quality_records(None).is_empty());
        assert!(air_quality_records(Some(AirQualityResponse { list: None })).is_empty());
    }
}
