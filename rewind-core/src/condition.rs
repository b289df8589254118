use serde::{Deserialize, Serialize};

/// Normalized weather condition shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Sunny,
    Cloudy,
    Rainy,
    PartlyCloudy,
}

impl ConditionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConditionKind::Sunny => "Sunny",
            ConditionKind::Cloudy => "Cloudy",
            ConditionKind::Rainy => "Rainy",
            ConditionKind::PartlyCloudy => "Partly Cloudy",
        }
    }

    /// Map an OpenWeatherMap condition id.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_owm_id(id: i32) -> Self {
        match id {
            // thunderstorm, drizzle, rain
            200..=599 => Self::Rainy,
            // snow, atmosphere (mist, fog, ...)
            600..=799 => Self::Cloudy,
            800 => Self::Sunny,
            801 | 802 => Self::PartlyCloudy,
            803 | 804 => Self::Cloudy,
            _ => Self::Cloudy,
        }
    }

    /// Map a WMO weather code as reported by Open-Meteo.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Sunny,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            51..=67 | 80..=82 => Self::Rainy,
            // fog, snow, thunderstorms
            _ => Self::Cloudy,
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which code vocabulary a raw condition code comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenWeather,
    Wmo,
}

pub fn normalize(code: i32, kind: ProviderKind) -> ConditionKind {
    match kind {
        ProviderKind::OpenWeather => ConditionKind::from_owm_id(code),
        ProviderKind::Wmo => ConditionKind::from_wmo_code(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owm_ranges() {
        assert_eq!(normalize(200, ProviderKind::OpenWeather), ConditionKind::Rainy);
        assert_eq!(normalize(599, ProviderKind::OpenWeather), ConditionKind::Rainy);
        assert_eq!(normalize(600, ProviderKind::OpenWeather), ConditionKind::Cloudy);
        assert_eq!(normalize(741, ProviderKind::OpenWeather), ConditionKind::Cloudy);
        assert_eq!(normalize(800, ProviderKind::OpenWeather), ConditionKind::Sunny);
        assert_eq!(normalize(801, ProviderKind::OpenWeather), ConditionKind::PartlyCloudy);
        assert_eq!(normalize(802, ProviderKind::OpenWeather), ConditionKind::PartlyCloudy);
        assert_eq!(normalize(803, ProviderKind::OpenWeather), ConditionKind::Cloudy);
        assert_eq!(normalize(804, ProviderKind::OpenWeather), ConditionKind::Cloudy);
    }

    #[test]
    fn owm_out_of_range_defaults_to_cloudy() {
        for id in [-1, 0, 199, 805, 900, i32::MAX, i32::MIN] {
            assert_eq!(normalize(id, ProviderKind::OpenWeather), ConditionKind::Cloudy);
        }
    }

    #[test]
    fn wmo_codes() {
        assert_eq!(normalize(0, ProviderKind::Wmo), ConditionKind::Sunny);
        assert_eq!(normalize(1, ProviderKind::Wmo), ConditionKind::PartlyCloudy);
        assert_eq!(normalize(2, ProviderKind::Wmo), ConditionKind::PartlyCloudy);
        assert_eq!(normalize(3, ProviderKind::Wmo), ConditionKind::Cloudy);
        assert_eq!(normalize(51, ProviderKind::Wmo), ConditionKind::Rainy);
        assert_eq!(normalize(67, ProviderKind::Wmo), ConditionKind::Rainy);
        assert_eq!(normalize(80, ProviderKind::Wmo), ConditionKind::Rainy);
        assert_eq!(normalize(82, ProviderKind::Wmo), ConditionKind::Rainy);
    }

    #[test]
    fn wmo_unmapped_defaults_to_cloudy() {
        // fog, snow, showers of snow, thunderstorm, garbage
        for code in [45, 48, 50, 68, 71, 79, 83, 95, 99, -3, 1000] {
            assert_eq!(normalize(code, ProviderKind::Wmo), ConditionKind::Cloudy, "code {code}");
        }
    }

    #[test]
    fn labels() {
        assert_eq!(ConditionKind::PartlyCloudy.to_string(), "Partly Cloudy");
        assert_eq!(ConditionKind::Rainy.label(), "Rainy");
    }
}
