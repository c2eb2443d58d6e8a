use crate::entities::{AddressKey, MapPoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Geocoding request failed: {0}")]
    Request(String),
    #[error("Geocoding service responded with status {0}")]
    Status(u16),
    #[error("Unexpected geocoding response: {0}")]
    Response(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait GeoCodingGateway {
    /// A short name for log messages.
    fn name(&self) -> &str;

    /// `Ok(None)` means the service has no match for the address.
    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> Result<Option<MapPoint>>;

    /// Resolve many addresses at once.
    ///
    /// The result has one entry per address in the same order.
    /// Services without a batch endpoint resolve the addresses one by one.
    fn resolve_addresses_lat_lng(&self, addrs: &[AddressKey]) -> Result<Vec<Option<MapPoint>>> {
        let resolved = addrs
            .iter()
            .map(|addr| match self.resolve_address_lat_lng(addr) {
                Ok(pos) => pos,
                Err(err) => {
                    log::warn!("{}: failed to resolve '{addr}': {err}", self.name());
                    None
                }
            })
            .collect();
        Ok(resolved)
    }
}

impl<G> GeoCodingGateway for &G
where
    G: GeoCodingGateway + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> Result<Option<MapPoint>> {
        (**self).resolve_address_lat_lng(addr)
    }

    fn resolve_addresses_lat_lng(&self, addrs: &[AddressKey]) -> Result<Vec<Option<MapPoint>>> {
        (**self).resolve_addresses_lat_lng(addrs)
    }
}
