use crate::config::GeocodingGateway as GatewayConfig;
use anyhow::Result;
use marketmap_core::{
    entities::{AddressKey, MapPoint},
    gateways::geocode::{self, GeoCodingGateway},
};
use marketmap_gateways::{census::Census, nominatim::Nominatim, opencage::OpenCage};

pub fn geocoding_gateway(cfg: &GatewayConfig) -> Result<GeoGw> {
    let gw = match cfg {
        GatewayConfig::Census {
            url,
            benchmark,
            request_delay,
            timeout,
        } => {
            log::info!("Use Census geocoding gateway ({url})");
            GeoGw::new(Census::try_new(
                url.clone(),
                benchmark.clone(),
                *request_delay,
                *timeout,
            )?)
        }
        GatewayConfig::Nominatim { url, request_delay } => {
            log::info!("Use Nominatim geocoding gateway ({url})");
            GeoGw::new(Nominatim::try_new(url.clone(), *request_delay)?)
        }
        GatewayConfig::OpenCage {
            api_key,
            request_delay,
        } => {
            log::info!("Use OpenCage geocoding gateway");
            GeoGw::new(OpenCage::new(api_key.clone(), *request_delay))
        }
    };
    Ok(gw)
}

pub struct GeoGw(Box<dyn GeoCodingGateway + 'static>);

impl GeoGw {
    pub fn new<G>(gw: G) -> Self
    where
        G: GeoCodingGateway + 'static,
    {
        Self(Box::new(gw))
    }
}

impl GeoCodingGateway for GeoGw {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> geocode::Result<Option<MapPoint>> {
        self.0.resolve_address_lat_lng(addr)
    }

    fn resolve_addresses_lat_lng(
        &self,
        addrs: &[AddressKey],
    ) -> geocode::Result<Vec<Option<MapPoint>>> {
        self.0.resolve_addresses_lat_lng(addrs)
    }
}
