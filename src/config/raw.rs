use duration_str::deserialize_duration;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

const DEFAULT_CONFIG_FILE: &str = include_str!("marketmap.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub geocoding: Option<Geocoding>,
    pub gateway: Option<Gateway>,
    pub columns: Option<Columns>,
    pub files: Option<Files>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

impl Config {
    /// Override the OpenCage API key of the configuration file.
    pub fn with_opencage_api_key(mut self, api_key: Option<String>) -> Self {
        let Some(api_key) = api_key else {
            return self;
        };
        let mut gateway = self.gateway.take().unwrap_or_default();
        let opencage = gateway.opencage.get_or_insert_with(OpenCage::default);
        opencage.api_key = Some(api_key);
        self.gateway = Some(gateway);
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub primary: GeocodingGateway,
    pub secondary: GeocodingGateway,
    pub placeholder: Option<Placeholder>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Config::default()
            .geocoding
            .expect("Geocoding configuration")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingGateway {
    Census,
    Nominatim,
    Opencage,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Placeholder {
    pub lat: f64,
    pub lng: f64,
}

impl Default for Placeholder {
    fn default() -> Self {
        Geocoding::default()
            .placeholder
            .expect("Placeholder configuration")
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub census: Option<Census>,
    pub nominatim: Option<Nominatim>,
    pub opencage: Option<OpenCage>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Census {
    pub url: String,
    pub benchmark: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_delay: Duration,
    #[serde(default = "default_census_timeout")]
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for Census {
    fn default() -> Self {
        default_gateway()
            .census
            .expect("Census gateway configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Nominatim {
    pub url: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_delay: Duration,
}

impl Default for Nominatim {
    fn default() -> Self {
        default_gateway()
            .nominatim
            .expect("Nominatim gateway configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OpenCage {
    pub api_key: Option<String>,
    #[serde(default = "default_opencage_request_delay")]
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_delay: Duration,
}

impl Default for OpenCage {
    fn default() -> Self {
        Self {
            api_key: None,
            request_delay: default_opencage_request_delay(),
        }
    }
}

fn default_census_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_opencage_request_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_gateway() -> Gateway {
    Config::default().gateway.expect("Gateway configuration")
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Columns {
    pub company: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Default for Columns {
    fn default() -> Self {
        Config::default().columns.expect("Columns configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Files {
    pub input: PathBuf,
    pub output_csv: PathBuf,
    pub output_json: PathBuf,
    pub failures: PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Config::default().files.expect("Files configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parse_default_config_from_file() {
        let cfg: Config = toml::from_str(DEFAULT_CONFIG_FILE).unwrap();
        assert!(cfg.geocoding.is_some());
        assert!(cfg.columns.is_some());
        assert!(cfg.files.is_some());
        let gateway = cfg.gateway.unwrap();
        assert!(gateway.census.is_some());
        assert!(gateway.nominatim.is_some());
        assert!(gateway.opencage.is_none());
    }

    #[test]
    fn default_gateway_config() {
        let census = Census::default();
        assert_eq!(census.benchmark, "Public_AR_Current");
        assert_eq!(census.request_delay, Duration::from_millis(200));
        assert_eq!(census.timeout, Duration::from_secs(600));
        let nominatim = Nominatim::default();
        assert_eq!(nominatim.request_delay, Duration::from_millis(1200));
    }

    #[test]
    fn parse_full_config_example_from_file() {
        let cfg_string = fs::read_to_string("src/config/marketmap.full-example.toml").unwrap();
        let cfg: Config = toml::from_str(&cfg_string).unwrap();
        let geocoding = cfg.geocoding.unwrap();
        assert_eq!(geocoding.secondary, GeocodingGateway::Opencage);
        let opencage = cfg.gateway.unwrap().opencage.unwrap();
        assert_eq!(opencage.request_delay, Duration::from_secs(1));
        assert!(opencage.api_key.is_some());
    }

    #[test]
    fn census_timeout_is_optional() {
        let cfg: Config = toml::from_str(
            r#"
            [gateway.census]
            url = "http://localhost:8080/addressbatch"
            benchmark = "Public_AR_Current"
            request-delay = "0s"
            "#,
        )
        .unwrap();
        let census = cfg.gateway.unwrap().census.unwrap();
        assert_eq!(census.timeout, default_census_timeout());

        let cfg: Config = toml::from_str(
            r#"
            [gateway.census]
            url = "http://localhost:8080/addressbatch"
            benchmark = "Public_AR_Current"
            request-delay = "0s"
            timeout = "90s"
            "#,
        )
        .unwrap();
        let census = cfg.gateway.unwrap().census.unwrap();
        assert_eq!(census.timeout, Duration::from_secs(90));
    }

    #[test]
    fn override_opencage_api_key() {
        let cfg = Config::default().with_opencage_api_key(Some("secret".into()));
        let gateway = cfg.gateway.unwrap();
        assert_eq!(gateway.opencage.unwrap().api_key.as_deref(), Some("secret"));
        assert!(gateway.census.is_some());
    }
}
