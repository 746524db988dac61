use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Report {
    pub current_condition: Vec<CurrentCondition>,
    pub weather: Vec<DayForecast>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentCondition {
    #[serde(rename = "temp_C")]
    pub temp_c: Option<String>,
    pub humidity: Option<String>,
    #[serde(rename = "weatherDesc")]
    pub weather_desc: Vec<TextValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextValue {
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DayForecast {
    #[serde(rename = "avgtempC")]
    pub avg_temp_c: Option<String>,
    #[serde(rename = "mintempC")]
    pub min_temp_c: Option<String>,
    #[serde(rename = "maxtempC")]
    pub max_temp_c: Option<String>,
    pub astronomy: Vec<Astronomy>,
    pub hourly: Vec<Hourly>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Astronomy {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Hourly {
    pub time: Option<String>,
    pub chanceofrain: Option<String>,
}

fn field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn representative_hour(hourly: &[Hourly]) -> Option<&Hourly> {
    hourly
        .iter()
        .find(|hour| field(&hour.time) == Some("1200"))
        .or_else(|| hourly.get(hourly.len() / 2))
}

/// Builds a ` | ` separated summary from whichever fields the report carries.
/// Returns an empty string when nothing usable is present.
pub fn summarize(report: &Report) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(current) = report.current_condition.first() {
        let temp = field(&current.temp_c).map(|t| format!("{t}C"));
        let desc = current.weather_desc.first().and_then(|d| field(&d.value));
        match (temp, desc) {
            (Some(temp), Some(desc)) => parts.push(format!("{temp} {desc}")),
            (Some(temp), None) => parts.push(temp),
            (None, Some(desc)) => parts.push(desc.to_string()),
            (None, None) => {}
        }
        if let Some(humidity) = field(&current.humidity) {
            parts.push(format!("Hum {humidity}%"));
        }
    }

    if let Some(today) = report.weather.first() {
        let range = match (field(&today.min_temp_c), field(&today.max_temp_c)) {
            (Some(min), Some(max)) => Some(format!("{min}-{max}C")),
            (Some(min), None) => Some(format!("Lo {min}C")),
            (None, Some(max)) => Some(format!("Hi {max}C")),
            (None, None) => None,
        };
        match (field(&today.avg_temp_c), range) {
            (Some(avg), Some(range)) => parts.push(format!("Avg {avg}C ({range})")),
            (Some(avg), None) => parts.push(format!("Avg {avg}C")),
            (None, Some(range)) => parts.push(range),
            (None, None) => {}
        }

        if let Some(rain) = representative_hour(&today.hourly).and_then(|h| field(&h.chanceofrain))
        {
            parts.push(format!("Rain {rain}%"));
        }

        if let Some(astro) = today.astronomy.first() {
            if let Some(rise) = field(&astro.sunrise) {
                parts.push(format!("Rise {rise}"));
            }
            if let Some(set) = field(&astro.sunset) {
                parts.push(format!("Set {set}"));
            }
        }
    }

    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(time: &str, rain: &str) -> Hourly {
        Hourly {
            time: Some(time.to_string()),
            chanceofrain: Some(rain.to_string()),
        }
    }

    #[test]
    fn prefers_midday_slot() {
        let hours = vec![hour("0", "1"), hour("1200", "40"), hour("2100", "90")];
        assert_eq!(
            representative_hour(&hours).and_then(|h| h.chanceofrain.clone()),
            Some("40".to_string())
        );
    }

    #[test]
    fn falls_back_to_middle_slot() {
        let hours = vec![hour("0", "1"), hour("600", "2"), hour("900", "3")];
        assert_eq!(
            representative_hour(&hours).and_then(|h| h.chanceofrain.clone()),
            Some("2".to_string())
        );
        assert!(representative_hour(&[]).is_none());
    }

    #[test]
    fn empty_report_summarizes_to_nothing() {
        assert_eq!(summarize(&Report::default()), "");
    }

    #[test]
    fn blank_fields_are_skipped() {
        let report = Report {
            current_condition: vec![CurrentCondition {
                temp_c: Some(" ".to_string()),
                humidity: Some("70".to_string()),
                weather_desc: vec![],
            }],
            weather: vec![],
        };
        assert_eq!(summarize(&report), "Hum 70%");
    }
}
