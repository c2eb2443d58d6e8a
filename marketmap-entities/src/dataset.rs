use crate::record::{is_derived_column, normalize_column_name, LocationRecord, DERIVED_COLUMNS};

/// The ordered list of location records together with
/// the ordered source columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<LocationRecord>,
}

impl Dataset {
    /// Create a dataset with an explicit header.
    ///
    /// Derived columns are removed from the header because
    /// they are always appended when writing the dataset.
    pub fn new<I, S>(header: I, records: Vec<LocationRecord>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns: Vec<String> = vec![];
        for name in header {
            push_column(&mut columns, name.as_ref());
        }
        for r in &records {
            for (name, _) in r.fields() {
                push_column(&mut columns, name);
            }
        }
        Self { columns, records }
    }

    /// Create a dataset whose header is the union of all
    /// record columns in the order of their first appearance.
    pub fn from_records(records: Vec<LocationRecord>) -> Self {
        Self::new(std::iter::empty::<&str>(), records)
    }

    /// The source columns without the derived columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The columns as they are written to the artifacts.
    pub fn output_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain(DERIVED_COLUMNS.iter().copied())
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [LocationRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record has a position.
    pub fn is_enriched(&self) -> bool {
        self.records.iter().all(|r| r.pos().is_some())
    }
}

fn push_column(columns: &mut Vec<String>, name: &str) {
    let name = normalize_column_name(name);
    if is_derived_column(name) || columns.iter().any(|c| c == name) {
        return;
    }
    columns.push(name.to_string());
}
