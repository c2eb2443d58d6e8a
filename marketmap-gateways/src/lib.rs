use geocoding::{Forward, GeocodingError, Point};
use marketmap_core::entities::MapPoint;

pub mod census;
pub mod nominatim;
pub mod opencage;
pub mod query;
mod throttle;

const USER_AGENT: &str = concat!("marketmap/", env!("CARGO_PKG_VERSION"));

/// Forward geocoding with any of the `geocoding` providers,
/// only the best match is taken into account.
fn forward_lat_lng<F>(gw: &F, query: &str) -> Result<Option<MapPoint>, GeocodingError>
where
    F: Forward<f64>,
{
    let points: Vec<Point<f64>> = gw.forward(query)?;
    let pos = points.first().and_then(|p| {
        let pos = MapPoint::try_from_lat_lng_deg(p.y(), p.x());
        if pos.is_none() {
            log::warn!("Ignoring invalid position {p:?} for '{query}'");
        }
        pos
    });
    Ok(pos)
}
