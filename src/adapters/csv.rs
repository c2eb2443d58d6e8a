use anyhow::{bail, Context as _, Result};
use marketmap_core::entities::{duplicate_column, Dataset, LocationRecord};
use std::{fs::File, io, path::Path};

pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let header = rdr.headers()?.clone();
    if let Some(name) = duplicate_column(header.iter()) {
        bail!("Duplicate column '{name}' in header");
    }
    let mut records = vec![];
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let record = LocationRecord::try_from_fields(header.iter().zip(row.iter()))
            .with_context(|| format!("Invalid record in line {line}"))?;
        records.push(record);
    }
    Ok(Dataset::new(header.iter(), records))
}

pub fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    let columns: Vec<_> = dataset.output_columns().collect();
    wtr.write_record(&columns)?;
    for r in dataset.records() {
        wtr.write_record(columns.iter().map(|column| r.cell(column)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_dataset_from_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    read_dataset(file).with_context(|| format!("Unable to read CSV from {}", path.display()))
}

pub fn write_dataset_to_file(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    write_dataset(file, dataset)
        .with_context(|| format!("Unable to write CSV to {}", path.display()))
}
