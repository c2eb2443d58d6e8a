use anyhow::{anyhow, Context as _, Result};
use marketmap_core::entities::{Columns, MapPoint};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "marketmap.toml";

const ENV_NAME_OPENCAGE_API_KEY: &str = "OPENCAGE_API_KEY";

pub struct Config {
    pub geocoding: Geocoding,
    pub columns: Columns,
    pub files: Files,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let raw_config = match file_path {
            Some(file_path) => {
                let file_path = file_path.as_ref();
                log::info!("Load configuration from {}", file_path.display());
                let cfg_string = fs::read_to_string(file_path)
                    .with_context(|| format!("Unable to read {}", file_path.display()))?;
                toml::from_str(&cfg_string)?
            }
            None => match fs::read_to_string(DEFAULT_CONFIG_FILE_NAME) {
                Ok(cfg_string) => {
                    log::info!("Load configuration from {DEFAULT_CONFIG_FILE_NAME}");
                    toml::from_str(&cfg_string)?
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::info!("{DEFAULT_CONFIG_FILE_NAME} not found => load default configuration.");
                    raw::Config::default()
                }
                Err(err) => return Err(err.into()),
            },
        };
        let opencage_api_key = env::var(ENV_NAME_OPENCAGE_API_KEY).ok();
        Self::try_from(raw_config.with_opencage_api_key(opencage_api_key))
    }
}

pub struct Geocoding {
    pub primary: GeocodingGateway,
    pub secondary: GeocodingGateway,
    pub placeholder: MapPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodingGateway {
    Census {
        url: String,
        benchmark: String,
        request_delay: Duration,
        timeout: Duration,
    },
    Nominatim {
        url: String,
        request_delay: Duration,
    },
    OpenCage {
        api_key: String,
        request_delay: Duration,
    },
}

impl GeocodingGateway {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Census { .. } => "census",
            Self::Nominatim { .. } => "nominatim",
            Self::OpenCage { .. } => "opencage",
        }
    }
}

pub struct Files {
    pub input: PathBuf,
    pub output_csv: PathBuf,
    pub output_json: PathBuf,
    pub failures: PathBuf,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            geocoding,
            gateway,
            columns,
            files,
        } = from;

        let raw::Geocoding {
            primary,
            secondary,
            placeholder,
        } = geocoding.unwrap_or_default();

        let gateway = gateway.unwrap_or_default();
        let primary = geocoding_gateway(primary, &gateway)?;
        let secondary = geocoding_gateway(secondary, &gateway)?;
        if primary == secondary {
            log::warn!("The primary and the secondary geocoding gateway are the same");
        }

        let raw::Placeholder { lat, lng } = placeholder.unwrap_or_default();
        let placeholder = MapPoint::try_from_lat_lng_deg(lat, lng)
            .ok_or_else(|| anyhow!("Invalid placeholder coordinates: {lat},{lng}"))?;

        let geocoding = Geocoding {
            primary,
            secondary,
            placeholder,
        };

        let raw::Columns {
            company,
            address,
            city,
            state,
            zip,
        } = columns.unwrap_or_default();
        let columns = Columns {
            company,
            address,
            city,
            state,
            zip,
        };

        let raw::Files {
            input,
            output_csv,
            output_json,
            failures,
        } = files.unwrap_or_default();
        let files = Files {
            input,
            output_csv,
            output_json,
            failures,
        };

        Ok(Self {
            geocoding,
            columns,
            files,
        })
    }
}

fn geocoding_gateway(
    gw_name: raw::GeocodingGateway,
    gateway: &raw::Gateway,
) -> Result<GeocodingGateway> {
    let gw = match gw_name {
        raw::GeocodingGateway::Census => {
            let raw::Census {
                url,
                benchmark,
                request_delay,
                timeout,
            } = gateway.census.clone().unwrap_or_default();
            GeocodingGateway::Census {
                url,
                benchmark,
                request_delay,
                timeout,
            }
        }
        raw::GeocodingGateway::Nominatim => {
            let raw::Nominatim { url, request_delay } =
                gateway.nominatim.clone().unwrap_or_default();
            GeocodingGateway::Nominatim { url, request_delay }
        }
        raw::GeocodingGateway::Opencage => {
            let raw::OpenCage {
                api_key,
                request_delay,
            } = gateway
                .opencage
                .clone()
                .ok_or_else(|| anyhow!("Missing 'opencage' gateway configuration"))?;
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| anyhow!("Missing OpenCage API key"))?;
            GeocodingGateway::OpenCage {
                api_key,
                request_delay,
            }
        }
    };
    Ok(gw)
}
