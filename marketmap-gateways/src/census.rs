//! Batch geocoding with the US Census Bureau geocoder.
//!
//! The addresses are uploaded as CSV with the columns
//! `id, street, city, state, zip` and the service responds with
//! one CSV line per address:
//!
//! ```text
//! "1","1 MAIN ST, SPRINGFIELD, IL, 62701","Match","Exact","...","-89.64,39.80","1234","L"
//! ```

use crate::{throttle::Throttle, USER_AGENT};
use marketmap_core::{
    entities::{AddressKey, MapPoint},
    gateways::geocode::{Error, GeoCodingGateway, Result},
};
use reqwest::blocking::{
    multipart::{Form, Part},
    Client,
};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://geocoding.geo.census.gov/geocoder/locations/addressbatch";
pub const DEFAULT_BENCHMARK: &str = "Public_AR_Current";

/// Upper limit of addresses per request accepted by the service.
const MAX_BATCH_SIZE: usize = 10_000;

const MATCH_STATUS: &str = "Match";
const COL_ID: usize = 0;
const COL_STATUS: usize = 2;
const COL_COORDINATES: usize = 5;

#[derive(Debug)]
pub struct Census {
    client: Client,
    url: String,
    benchmark: String,
    throttle: Throttle,
}

impl Census {
    /// `timeout` limits a whole batch request. The service replies only
    /// after every address of the upload has been geocoded.
    pub fn try_new(
        url: String,
        benchmark: String,
        request_delay: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Request(err.to_string()))?;
        Ok(Self {
            client,
            url,
            benchmark,
            throttle: Throttle::new(request_delay),
        })
    }

    fn post_batch(&self, payload: String) -> Result<String> {
        let file = Part::text(payload)
            .file_name("addresses.csv")
            .mime_str("text/csv")
            .map_err(|err| Error::Request(err.to_string()))?;
        let form = Form::new()
            .text("benchmark", self.benchmark.clone())
            .text("returntype", "locations")
            .part("addressFile", file);
        self.throttle.wait();
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|err| Error::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        response
            .text()
            .map_err(|err| Error::Response(err.to_string()))
    }
}

impl GeoCodingGateway for Census {
    fn name(&self) -> &str {
        "Census"
    }

    fn resolve_address_lat_lng(&self, addr: &AddressKey) -> Result<Option<MapPoint>> {
        let resolved = self.resolve_addresses_lat_lng(std::slice::from_ref(addr))?;
        Ok(resolved.into_iter().next().flatten())
    }

    fn resolve_addresses_lat_lng(&self, addrs: &[AddressKey]) -> Result<Vec<Option<MapPoint>>> {
        resolve_chunks(addrs, MAX_BATCH_SIZE, |chunk| {
            log::info!("Uploading {} addresses to the Census geocoder", chunk.len());
            let payload = batch_payload(chunk)?;
            let body = self.post_batch(payload)?;
            let resolved = parse_batch_response(&body, chunk.len())?;
            log::info!(
                "Census geocoder matched {} of {} addresses",
                resolved.iter().filter(|pos| pos.is_some()).count(),
                chunk.len()
            );
            Ok(resolved)
        })
    }
}

/// Resolve the addresses chunk by chunk.
///
/// The addresses of a failed chunk stay unresolved. Only if every
/// chunk fails the last error is returned.
fn resolve_chunks<F>(
    addrs: &[AddressKey],
    chunk_size: usize,
    mut resolve_chunk: F,
) -> Result<Vec<Option<MapPoint>>>
where
    F: FnMut(&[AddressKey]) -> Result<Vec<Option<MapPoint>>>,
{
    let mut resolved = Vec::with_capacity(addrs.len());
    let mut last_err = None;
    let mut succeeded = 0;
    for chunk in addrs.chunks(chunk_size) {
        match resolve_chunk(chunk) {
            Ok(chunk_resolved) if chunk_resolved.len() == chunk.len() => {
                succeeded += 1;
                resolved.extend(chunk_resolved);
            }
            Ok(chunk_resolved) => {
                log::warn!(
                    "Census geocoder returned {} results for {} addresses",
                    chunk_resolved.len(),
                    chunk.len()
                );
                resolved.extend(std::iter::repeat_n(None, chunk.len()));
            }
            Err(err) => {
                log::warn!("Census batch of {} addresses failed: {err}", chunk.len());
                resolved.extend(std::iter::repeat_n(None, chunk.len()));
                last_err = Some(err);
            }
        }
    }
    match last_err {
        Some(err) if succeeded == 0 => Err(err),
        _ => Ok(resolved),
    }
}

/// The CSV upload; the id of an address is its index.
pub fn batch_payload(addrs: &[AddressKey]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    for (id, addr) in addrs.iter().enumerate() {
        let id = id.to_string();
        wtr.write_record([
            id.as_str(),
            addr.address.as_str(),
            addr.city.as_str(),
            addr.state.as_str(),
            addr.zip.as_str(),
        ])
        .map_err(|err| Error::Other(err.into()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|err| Error::Other(anyhow::anyhow!("{err}")))?;
    String::from_utf8(bytes).map_err(|err| Error::Other(err.into()))
}

/// Parse the response into one entry per uploaded address.
///
/// Only lines with status `Match` yield a position. Lines with an
/// unknown id, e.g. a header line, are ignored.
pub fn parse_batch_response(body: &str, count: usize) -> Result<Vec<Option<MapPoint>>> {
    let mut resolved = vec![None; count];
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    for line in rdr.records() {
        let line = line.map_err(|err| Error::Response(err.to_string()))?;
        let Some(idx) = line
            .get(COL_ID)
            .and_then(|id| id.trim().parse::<usize>().ok())
            .filter(|idx| *idx < count)
        else {
            log::debug!("Skipping response line {line:?}");
            continue;
        };
        if line.get(COL_STATUS).map(str::trim) != Some(MATCH_STATUS) {
            continue;
        }
        let Some(coordinates) = line.get(COL_COORDINATES).filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        resolved[idx] = parse_lng_lat(coordinates);
        if resolved[idx].is_none() {
            log::warn!("Invalid coordinates '{coordinates}' for address #{idx}");
        }
    }
    Ok(resolved)
}

/// The service delivers `longitude,latitude`.
fn parse_lng_lat(s: &str) -> Option<MapPoint> {
    let (lng, lat) = s.split_once(',')?;
    MapPoint::parse_lat_lng_deg(lat, lng).ok()
}
