use crate::{query::forward_queries, throttle::Throttle, USER_AGENT};
use marketmap_core::{
    entities::{AddressKey, MapPoint},
    gateways::geocode::{Error, GeoCodingGateway, Result},
};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://nominatim.openstreetmap.org/";

/// Forward geocoding with the OpenStreetMap Nominatim service.
///
/// Each address is queried with decreasing precision until
/// one of the queries has a match.
#[derive(Debug)]
pub struct Nominatim {
    client: Client,
    search_url: String,
    throttle: Throttle,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Nominatim {
    pub fn try_new(url: String, request_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| Error::Request(err.to_string()))?;
        Ok(Self {
            client,
            search_url: search_url(&url),
            throttle: Throttle::new(request_delay),
        })
    }

    fn search(&self, query: &str) -> Result<Option<MapPoint>> {
        self.throttle.wait();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .send()
            .map_err(|err| Error::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|err| Error::Response(err.to_string()))?;
        parse_search_response(&body)
    }
}

fn search_url(url: &str) -> String {
    format!("{}/search", url.trim_end_matches('/'))
}

/// The best match of a search response, if any.
pub fn parse_search_response(body: &str) -> Result<Option<MapPoint>> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|err| Error::Response(err.to_string()))?;
    let Some(Place { lat, lon }) = places.into_iter().next() else {
        return Ok(None);
    };
    match MapPoint::parse_lat_lng_deg(&lat, &lon) {
        Ok(pos) => Ok(Some(pos)),
        Err(err) => {
            log::warn!("Ignoring invalid position '{lat},{lon}': {err}");
            Ok(None)
        }
    }
}

impl GeoCodingGateway for Nominatim {
    fn name(&self) -> &str {
        "Nominatim"
    }

    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> Result<Option<MapPoint>> {
        let mut last_err = None;
        for query in forward_queries(addr) {
            match self.search(&query) {
                Ok(Some(pos)) => {
                    log::debug!("Nominatim resolved '{query}' to {pos}");
                    return Ok(Some(pos));
                }
                Ok(None) => {
                    log::debug!("Nominatim has no match for '{query}'");
                }
                Err(err) => {
                    log::debug!("Nominatim failed to resolve '{query}': {err}");
                    last_err = Some(err);
                }
            }
        }
        match last_err {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_search_url() {
        assert_eq!(
            search_url(DEFAULT_URL),
            "https://nominatim.openstreetmap.org/search"
        );
        assert_eq!(search_url("http://localhost:8080"), "http://localhost:8080/search");
    }

    #[test]
    fn encode_search_query() {
        let gw = Nominatim::try_new(DEFAULT_URL.into(), Duration::ZERO).unwrap();
        let request = gw
            .client
            .get(&gw.search_url)
            .query(&[("q", "SPRINGFIELD, IL")])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://nominatim.openstreetmap.org/search?q=SPRINGFIELD%2C+IL"
        );
    }

    #[test]
    fn parse_best_match() {
        let body = r#"[
            {"place_id": 1, "lat": "39.7990175", "lon": "-89.6439575", "display_name": "Springfield"},
            {"place_id": 2, "lat": "37.2090", "lon": "-93.2923", "display_name": "Springfield"}
        ]"#;
        assert_eq!(
            parse_search_response(body).unwrap(),
            MapPoint::try_from_lat_lng_deg(39.7990175, -89.6439575)
        );
    }

    #[test]
    fn parse_no_match() {
        assert_eq!(parse_search_response("[]").unwrap(), None);
    }

    #[test]
    fn ignore_invalid_positions() {
        let body = r#"[{"lat": "95.0", "lon": "0.0"}]"#;
        assert_eq!(parse_search_response(body).unwrap(), None);
    }

    #[test]
    fn reject_malformed_response() {
        assert!(matches!(
            parse_search_response("<html>"),
            Err(Error::Response(_))
        ));
    }
}
