use anyhow::{Context as _, Result};
use marketmap_core::{
    entities::{Columns, Dataset, LocationRecord, LATITUDE, LONGITUDE},
    usecases::Failure,
};
use serde::{
    de::{MapAccess, Visitor},
    ser::{SerializeMap, Serializer},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value as JsonValue;
use std::{fmt, fs::File, io, path::Path};

/// A record serialized as an object whose keys follow the column order.
struct RecordObject<'a> {
    columns: &'a [&'a str],
    record: &'a LocationRecord,
}

impl Serialize for RecordObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        let pos = self.record.pos().map(|pos| pos.to_lat_lng_deg());
        for column in self.columns {
            match (*column, pos) {
                (LATITUDE, Some((lat, _))) => map.serialize_entry(column, &lat)?,
                (LONGITUDE, Some((_, lng))) => map.serialize_entry(column, &lng)?,
                _ => map.serialize_entry(column, &self.record.cell(column))?,
            }
        }
        map.end()
    }
}

/// The key/value pairs of a JSON object in document order.
struct ObjectEntries(Vec<(String, JsonValue)>);

impl<'de> Deserialize<'de> for ObjectEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ObjectEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some(entry) = map.next_entry::<String, JsonValue>()? {
                    entries.push(entry);
                }
                Ok(ObjectEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn cell_value(value: JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

pub fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let columns: Vec<_> = dataset.output_columns().collect();
    let objects: Vec<_> = dataset
        .records()
        .iter()
        .map(|record| RecordObject {
            columns: &columns,
            record,
        })
        .collect();
    serde_json::to_writer_pretty(writer, &objects)?;
    Ok(())
}

pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset> {
    let objects: Vec<ObjectEntries> = serde_json::from_reader(reader)?;
    let mut header: Vec<String> = vec![];
    let mut records = Vec::with_capacity(objects.len());
    for (idx, ObjectEntries(entries)) in objects.into_iter().enumerate() {
        if idx == 0 {
            header = entries.iter().map(|(key, _)| key.clone()).collect();
        }
        let cells = entries
            .into_iter()
            .map(|(key, value)| (key, cell_value(value)));
        let record = LocationRecord::try_from_fields(cells)
            .with_context(|| format!("Invalid record at index {idx}"))?;
        records.push(record);
    }
    Ok(Dataset::new(header, records))
}

struct FailureObject<'a> {
    columns: &'a Columns,
    failure: &'a Failure,
}

impl Serialize for FailureObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Self { columns, failure } = self;
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(&columns.company, &failure.company)?;
        map.serialize_entry(&columns.city, &failure.city)?;
        map.serialize_entry(&columns.state, &failure.state)?;
        map.serialize_entry(&columns.zip, &failure.zip)?;
        map.end()
    }
}

pub fn write_failures<W: io::Write>(
    writer: W,
    columns: &Columns,
    failures: &[Failure],
) -> Result<()> {
    let objects: Vec<_> = failures
        .iter()
        .map(|failure| FailureObject { columns, failure })
        .collect();
    serde_json::to_writer_pretty(writer, &objects)?;
    Ok(())
}

pub fn read_dataset_from_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    read_dataset(io::BufReader::new(file))
        .with_context(|| format!("Unable to read JSON from {}", path.display()))
}

pub fn write_dataset_to_file(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    write_dataset(io::BufWriter::new(file), dataset)
        .with_context(|| format!("Unable to write JSON to {}", path.display()))
}

pub fn write_failures_to_file(path: &Path, columns: &Columns, failures: &[Failure]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    write_failures(io::BufWriter::new(file), columns, failures)
        .with_context(|| format!("Unable to write JSON to {}", path.display()))
}
