use super::prelude::*;

/// The geographic center of the contiguous United States.
///
/// Assigned whenever no geocoder resolves an address. The point is a
/// marker for "unknown", not the position of the record.
pub const DEFAULT_PLACEHOLDER: MapPoint = MapPoint::new(
    LatCoord::from_deg_unchecked(39.8283),
    LngCoord::from_deg_unchecked(-98.5795),
);

/// The outcome of a coordinate lookup, tagged with the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Primary(MapPoint),
    Secondary(MapPoint),
    Placeholder(MapPoint),
}

impl Resolution {
    pub const fn pos(self) -> MapPoint {
        match self {
            Self::Primary(pos) | Self::Secondary(pos) | Self::Placeholder(pos) => pos,
        }
    }

    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Two-tier geocoding with a fixed placeholder as last resort.
///
/// Lookup failures never reach the caller.
#[derive(Debug)]
pub struct CoordinateResolver<P, S> {
    primary: P,
    secondary: S,
    placeholder: MapPoint,
}

impl<P, S> CoordinateResolver<P, S>
where
    P: GeoCodingGateway,
    S: GeoCodingGateway,
{
    pub const fn new(primary: P, secondary: S, placeholder: MapPoint) -> Self {
        Self {
            primary,
            secondary,
            placeholder,
        }
    }

    pub fn resolve(&self, key: &AddressKey) -> Resolution {
        if let Some(pos) = lookup(&self.primary, key) {
            return Resolution::Primary(pos);
        }
        self.resolve_secondary_or_placeholder(key)
    }

    /// Resolve all keys with a single batch request to the primary
    /// gateway and single requests to the secondary gateway for
    /// every key that is still unresolved.
    pub fn resolve_all(&self, keys: &[AddressKey]) -> Vec<Resolution> {
        if keys.is_empty() {
            return vec![];
        }
        let primary = match self.primary.resolve_addresses_lat_lng(keys) {
            Ok(resolved) if resolved.len() == keys.len() => resolved,
            Ok(resolved) => {
                log::warn!(
                    "{} resolved {} instead of {} addresses: ignoring the batch result",
                    self.primary.name(),
                    resolved.len(),
                    keys.len()
                );
                vec![None; keys.len()]
            }
            Err(err) => {
                log::warn!(
                    "{} failed to resolve {} addresses: {err}",
                    self.primary.name(),
                    keys.len()
                );
                vec![None; keys.len()]
            }
        };
        let missing = primary.iter().filter(|pos| pos.is_none()).count();
        if missing > 0 {
            log::info!(
                "{missing} of {} addresses unresolved by {}: trying {}",
                keys.len(),
                self.primary.name(),
                self.secondary.name()
            );
        }
        keys.iter()
            .zip(primary)
            .map(|(key, pos)| match pos {
                Some(pos) => Resolution::Primary(pos),
                None => self.resolve_secondary_or_placeholder(key),
            })
            .collect()
    }

    fn resolve_secondary_or_placeholder(&self, key: &AddressKey) -> Resolution {
        if let Some(pos) = lookup(&self.secondary, key) {
            return Resolution::Secondary(pos);
        }
        log::warn!("Unable to resolve '{key}': using placeholder {}", self.placeholder);
        Resolution::Placeholder(self.placeholder)
    }
}

fn lookup<G: GeoCodingGateway>(gw: &G, key: &AddressKey) -> Option<MapPoint> {
    if key.is_empty() {
        return None;
    }
    match gw.resolve_address_lat_lng(key) {
        Ok(Some(pos)) => {
            log::debug!("{}: resolved '{key}' to {pos}", gw.name());
            Some(pos)
        }
        Ok(None) => {
            log::debug!("{}: no match for '{key}'", gw.name());
            None
        }
        Err(err) => {
            log::warn!("{}: failed to resolve '{key}': {err}", gw.name());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::*;

    #[test]
    fn prefer_the_primary_gateway() {
        let primary = MockGeoGw::new("primary").with(&springfield_key(), 39.8, -89.6);
        let secondary = MockGeoGw::new("secondary").with(&springfield_key(), 1.0, 1.0);
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        let res = resolver.resolve(&springfield_key());
        assert_eq!(res, Resolution::Primary(point(39.8, -89.6)));
        assert!(secondary.requests().is_empty());
    }

    #[test]
    fn fall_back_to_the_secondary_gateway_on_miss() {
        let primary = MockGeoGw::new("primary");
        let secondary = MockGeoGw::new("secondary").with(&springfield_key(), 39.8, -89.6);
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        let res = resolver.resolve(&springfield_key());
        assert_eq!(res, Resolution::Secondary(point(39.8, -89.6)));
        assert_eq!(primary.requests(), vec![springfield_key()]);
    }

    #[test]
    fn fall_back_to_the_secondary_gateway_on_error() {
        let primary = MockGeoGw::failing("primary");
        let secondary = MockGeoGw::new("secondary").with(&springfield_key(), 39.8, -89.6);
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        assert_eq!(
            resolver.resolve(&springfield_key()),
            Resolution::Secondary(point(39.8, -89.6))
        );
    }

    #[test]
    fn assign_placeholder_if_nothing_matches() {
        let primary = MockGeoGw::failing("primary");
        let secondary = MockGeoGw::new("secondary");
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        let res = resolver.resolve(&springfield_key());
        assert!(res.is_placeholder());
        assert_eq!(res.pos().to_lat_lng_deg(), (39.8283, -98.5795));
    }

    #[test]
    fn never_query_an_empty_key() {
        let primary = MockGeoGw::new("primary");
        let secondary = MockGeoGw::new("secondary");
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        assert!(resolver.resolve(&AddressKey::default()).is_placeholder());
        assert!(primary.requests().is_empty());
        assert!(secondary.requests().is_empty());
    }

    #[test]
    fn resolve_all_with_one_batch_request() {
        let dayton = key("DAYTON", "OH");
        let nowhere = key("NOWHERE", "ZZ");
        let primary = MockGeoGw::new("primary").with(&springfield_key(), 39.8, -89.6);
        let secondary = MockGeoGw::new("secondary").with(&dayton, 39.76, -84.19);
        let placeholder = point(0.0, 0.0);
        let resolver = CoordinateResolver::new(&primary, &secondary, placeholder);

        let keys = vec![springfield_key(), dayton.clone(), nowhere.clone()];
        let res = resolver.resolve_all(&keys);

        assert_eq!(
            res,
            vec![
                Resolution::Primary(point(39.8, -89.6)),
                Resolution::Secondary(point(39.76, -84.19)),
                Resolution::Placeholder(placeholder),
            ]
        );
        assert_eq!(primary.batches(), vec![keys.clone()]);
        assert_eq!(secondary.requests(), vec![dayton, nowhere]);
    }

    #[test]
    fn resolve_all_when_the_batch_request_fails() {
        let primary = MockGeoGw::failing("primary");
        let secondary = MockGeoGw::new("secondary").with(&springfield_key(), 39.8, -89.6);
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        let res = resolver.resolve_all(&[springfield_key(), key("NOWHERE", "ZZ")]);
        assert_eq!(res[0], Resolution::Secondary(point(39.8, -89.6)));
        assert!(res[1].is_placeholder());
    }

    #[test]
    fn resolve_nothing() {
        let primary = MockGeoGw::new("primary");
        let secondary = MockGeoGw::new("secondary");
        let resolver = CoordinateResolver::new(&primary, &secondary, DEFAULT_PLACEHOLDER);
        assert!(resolver.resolve_all(&[]).is_empty());
        assert!(primary.batches().is_empty());
    }
}
