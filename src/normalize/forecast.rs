use super::weather::first_condition_text;
use super::{format_date, format_timestamp};
use crate::models::{
    NormalizedForecastRecord, RawDailyForecastRecord, RawForecastRecord, Temperature,
};

/// Normalizes hourly or 5-day/3-hour forecast entries.
///
/// The timestamp comes from `dt_txt` when the provider sent one, otherwise from `dt`.
pub fn normalize_forecast(records: &[RawForecastRecord]) -> Vec<NormalizedForecastRecord> {
    records
        .iter()
        .map(|r| NormalizedForecastRecord {
            date_time: r
                .dt_txt
                .clone()
                .unwrap_or_else(|| format_timestamp(r.dt)),
            temperature: Temperature::Scalar(r.main.temp),
            condition: first_condition_text(&r.weather),
        })
        .collect()
}

/// Normalizes daily forecast entries; each day carries a day/night temperature pair.
pub fn normalize_daily_forecast(
    records: &[RawDailyForecastRecord],
) -> Vec<NormalizedForecastRecord> {
    records
        .iter()
        .map(|r| NormalizedForecastRecord {
            date_time: format_date(r.dt),
            temperature: Temperature::DayNight {
                day: r.temp.day,
                night: r.temp.night,
            },
            condition: first_condition_text(&r.weather),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawCondition, RawDayNight, RawForecastMain};

    #[test]
    fn prefers_provider_text_timestamp() {
        let records = vec![
            RawForecastRecord {
                dt: 1_606_223_802,
                dt_txt: Some("2020-11-24 12:00:00".into()),
                main: RawForecastMain { temp: Some(7.5) },
                weather: vec![RawCondition {
                    main: "Snow".into(),
                    description: "light snow".into(),
                }],
            },
            RawForecastRecord {
                dt: 1_606_223_802,
                dt_txt: None,
                main: RawForecastMain { temp: None },
                weather: vec![],
            },
        ];

        let out = normalize_forecast(&records);
        assert_eq!(out[0].date_time, "2020-11-24 12:00:00");
        assert_eq!(out[0].temperature, Temperature::Scalar(Some(7.5)));
        assert_eq!(out[0].condition, "Snow - light snow");
        assert_eq!(out[1].date_time, "2020-11-24 13:16:42");
        assert_eq!(out[1].temperature, Temperature::Scalar(None));
        assert_eq!(out[1].condition, " - ");
    }

    #[test]
    fn daily_records_carry_day_and_night() {
        let records = vec![RawDailyForecastRecord {
            dt: 1_606_223_802,
            temp: RawDayNight {
                day: 9.0,
                night: 2.5,
            },
            weather: vec![RawCondition {
                main: "Clear".into(),
                description: "sky is clear".into(),
            }],
        }];

        let out = normalize_daily_forecast(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date_time, "2020-11-24");
        assert_eq!(
            out[0].temperature,
            Temperature::DayNight {
                day: 9.0,
                night: 2.5
            }
        );
        assert_eq!(out[0].condition, "Clear - sky is clear");
    }
}
