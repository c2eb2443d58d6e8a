use crate::{forward_lat_lng, query::forward_queries, throttle::Throttle};
use geocoding::Opencage;
use marketmap_core::{
    entities::{AddressKey, MapPoint},
    gateways::geocode::{Error, GeoCodingGateway, Result},
};
use std::time::Duration;

/// Forward geocoding with the commercial OpenCage API.
///
/// Every request is billed, so only the most specific
/// query of an address is sent.
pub struct OpenCage {
    oc: Opencage<'static>,
    throttle: Throttle,
}

impl OpenCage {
    pub fn new(api_key: String, request_delay: Duration) -> Self {
        Self {
            oc: Opencage::new(api_key),
            throttle: Throttle::new(request_delay),
        }
    }
}

impl std::fmt::Debug for OpenCage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("OpenCage")
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

impl GeoCodingGateway for OpenCage {
    fn name(&self) -> &str {
        "OpenCage"
    }

    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> Result<Option<MapPoint>> {
        let Some(query) = forward_queries(addr).into_iter().next() else {
            return Ok(None);
        };
        self.throttle.wait();
        forward_lat_lng(&self.oc, &query).map_err(|err| Error::Request(err.to_string()))
    }
}
