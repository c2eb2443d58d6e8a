use crate::{
    address::Address,
    geo::{MapPoint, MapPointParseError},
};
use itertools::Itertools;
use thiserror::Error;

pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const LOCATION: &str = "Location";

/// Columns that are computed by the enrichment and
/// therefore never treated as source data.
pub const DERIVED_COLUMNS: [&str; 3] = [LATITUDE, LONGITUDE, LOCATION];

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Strip a leading byte order mark and surrounding whitespace.
pub fn normalize_column_name(name: &str) -> &str {
    name.trim_start_matches(BYTE_ORDER_MARK).trim()
}

pub fn is_derived_column(name: &str) -> bool {
    DERIVED_COLUMNS.contains(&name)
}

/// The first column name that occurs more than once.
pub fn duplicate_column<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().map(normalize_column_name).duplicates().next()
}

/// Names of the source columns that carry the well-known fields.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub company : String,
    pub address : String,
    pub city    : String,
    pub state   : String,
    pub zip     : String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            company: "Location Code".into(),
            address: "Address Line 1".into(),
            city: "City".into(),
            state: "State".into(),
            zip: "Zip".into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Column '{0}' occurs more than once")]
    DuplicateColumn(String),
    #[error("Only one of 'Latitude' and 'Longitude' is populated")]
    PartialCoordinates,
    #[error(transparent)]
    MapPoint(#[from] MapPointParseError),
}

/// One row of the location dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRecord {
    fields: Vec<(String, String)>,
    pos: Option<MapPoint>,
    location: Option<String>,
}

impl LocationRecord {
    /// Create a record from the cells of a source row.
    ///
    /// Pre-existing `Latitude`, `Longitude` and `Location` cells are
    /// picked up as the current enrichment of the record.
    pub fn try_from_fields<I, K, V>(cells: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = vec![];
        let mut lat = None;
        let mut lng = None;
        let mut location = None;
        for (name, value) in cells {
            let name = normalize_column_name(name.as_ref());
            let cell = match name {
                LATITUDE => &mut lat,
                LONGITUDE => &mut lng,
                LOCATION => &mut location,
                _ => {
                    if fields.iter().any(|(n, _)| n == name) {
                        return Err(ParseError::DuplicateColumn(name.to_string()));
                    }
                    fields.push((name.to_string(), value.into()));
                    continue;
                }
            };
            if cell.is_some() {
                return Err(ParseError::DuplicateColumn(name.to_string()));
            }
            *cell = Some(value.into());
        }
        let lat = lat.filter(|v| !v.trim().is_empty());
        let lng = lng.filter(|v| !v.trim().is_empty());
        let pos = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(MapPoint::parse_lat_lng_deg(&lat, &lng)?),
            (None, None) => None,
            _ => return Err(ParseError::PartialCoordinates),
        };
        let location = location.filter(|l| !l.is_empty());
        Ok(Self {
            fields,
            pos,
            location,
        })
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The value of a source column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn pos(&self) -> Option<MapPoint> {
        self.pos
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Latitude, longitude and location are always set together.
    pub fn set_location(&mut self, pos: MapPoint, label: String) {
        self.pos = Some(pos);
        self.location = Some(label);
    }

    pub fn address(&self, columns: &Columns) -> Address {
        let value = |column: &str| {
            self.get(column)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };
        Address {
            street: value(&columns.address),
            city: value(&columns.city),
            state: value(&columns.state),
            zip: value(&columns.zip),
        }
    }

    /// The cell of a derived column as it is written to the artifacts.
    pub fn derived_cell(&self, column: &str) -> Option<String> {
        let cell = match column {
            LATITUDE => self.pos.map(|p| p.lat().to_string()).unwrap_or_default(),
            LONGITUDE => self.pos.map(|p| p.lng().to_string()).unwrap_or_default(),
            LOCATION => self.location.clone().unwrap_or_default(),
            _ => return None,
        };
        Some(cell)
    }

    /// The cell of any column, an unknown column is empty.
    pub fn cell(&self, column: &str) -> String {
        self.derived_cell(column)
            .or_else(|| self.get(column).map(ToString::to_string))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springfield() -> Vec<(&'static str, &'static str)> {
        vec![
            ("\u{feff}Region", "Midwest"),
            ("Location Code", "Acme"),
            ("Line of Business", "Retail"),
            ("Address Line 1", ""),
            ("City", " Springfield "),
            ("State", "IL"),
            ("Zip", "62701"),
        ]
    }

    #[test]
    fn create_record_from_source_row() {
        let r = LocationRecord::try_from_fields(springfield()).unwrap();
        assert_eq!(r.fields().len(), 7);
        assert_eq!(r.get("Region"), Some("Midwest"));
        assert_eq!(r.get("Location Code"), Some("Acme"));
        assert!(r.pos().is_none());
        assert!(r.location().is_none());
    }

    #[test]
    fn extract_address() {
        let r = LocationRecord::try_from_fields(springfield()).unwrap();
        let addr = r.address(&Columns::default());
        assert_eq!(addr.street, None);
        assert_eq!(addr.city.as_deref(), Some("Springfield"));
        assert_eq!(addr.state.as_deref(), Some("IL"));
        assert_eq!(addr.zip.as_deref(), Some("62701"));
    }

    #[test]
    fn pick_up_existing_enrichment() {
        let mut row = springfield();
        row.push(("Latitude", "39.801055"));
        row.push(("Longitude", "-89.643604"));
        row.push(("Location", "Springfield, IL"));
        let r = LocationRecord::try_from_fields(row).unwrap();
        assert_eq!(r.fields().len(), 7);
        assert_eq!(r.pos().unwrap().to_lat_lng_deg(), (39.801055, -89.643604));
        assert_eq!(r.location(), Some("Springfield, IL"));
        assert_eq!(r.cell("Latitude"), "39.801055");
        assert_eq!(r.cell("Longitude"), "-89.643604");
    }

    #[test]
    fn empty_coordinates_are_absent() {
        let mut row = springfield();
        row.push(("Latitude", ""));
        row.push(("Longitude", " "));
        row.push(("Location", ""));
        let r = LocationRecord::try_from_fields(row).unwrap();
        assert!(r.pos().is_none());
        assert!(r.location().is_none());
        assert_eq!(r.cell("Latitude"), "");
        assert_eq!(r.cell("Location"), "");
    }

    #[test]
    fn reject_partial_coordinates() {
        let mut row = springfield();
        row.push(("Latitude", "39.8"));
        row.push(("Longitude", ""));
        assert_eq!(
            LocationRecord::try_from_fields(row),
            Err(ParseError::PartialCoordinates)
        );
        let mut row = springfield();
        row.push(("Longitude", "-89.6"));
        assert_eq!(
            LocationRecord::try_from_fields(row),
            Err(ParseError::PartialCoordinates)
        );
    }

    #[test]
    fn set_location() {
        let mut r = LocationRecord::try_from_fields(springfield()).unwrap();
        let pos = MapPoint::try_from_lat_lng_deg(39.8, -89.6).unwrap();
        r.set_location(pos, "Springfield, IL".into());
        assert_eq!(r.pos(), Some(pos));
        assert_eq!(r.cell("Location"), "Springfield, IL");
        assert_eq!(r.cell("Latitude"), "39.8");
    }

    #[test]
    fn reject_duplicate_columns() {
        let mut row = springfield();
        row.push(("City", "Dayton"));
        assert_eq!(
            LocationRecord::try_from_fields(row),
            Err(ParseError::DuplicateColumn("City".into()))
        );
        let mut row = springfield();
        row.push(("Latitude", "39.8"));
        row.push(("Latitude", "39.9"));
        assert_eq!(
            LocationRecord::try_from_fields(row),
            Err(ParseError::DuplicateColumn("Latitude".into()))
        );
    }

    #[test]
    fn find_duplicate_column_names() {
        assert_eq!(duplicate_column(["City", "Note", "State"]), None);
        assert_eq!(duplicate_column(["City", "Note", "Note"]), Some("Note"));
        assert_eq!(duplicate_column(["\u{feff}Region", "Region"]), Some("Region"));
    }

    #[test]
    fn unknown_column_is_empty() {
        let r = LocationRecord::try_from_fields(springfield()).unwrap();
        assert_eq!(r.cell("Phone"), "");
        assert_eq!(r.derived_cell("City"), None);
    }
}
