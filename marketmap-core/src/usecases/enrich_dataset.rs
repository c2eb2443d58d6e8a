use super::{prelude::*, *};
use std::collections::HashMap;

/// A record that could not be resolved and got the placeholder.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub company : String,
    pub city    : String,
    pub state   : String,
    pub zip     : String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub records: usize,
    pub unique_addresses: usize,
    pub primary: usize,
    pub secondary: usize,
    pub placeholder: usize,
    pub failures: Vec<Failure>,
}

/// Attach coordinates and a location label to every record.
///
/// Each distinct address is resolved once in order of its first
/// appearance. The batch always completes: unresolved records
/// get the placeholder of the resolver.
pub fn enrich_dataset<P, S>(
    dataset: &mut Dataset,
    columns: &Columns,
    resolver: &CoordinateResolver<P, S>,
) -> EnrichmentReport
where
    P: GeoCodingGateway,
    S: GeoCodingGateway,
{
    let addresses: Vec<_> = dataset
        .records()
        .iter()
        .map(|r| r.address(columns))
        .collect();

    let mut unique_keys = vec![];
    let mut key_index = HashMap::new();
    let record_keys: Vec<usize> = addresses
        .iter()
        .map(|addr| {
            let key = normalize_address(addr);
            *key_index.entry(key.clone()).or_insert_with(|| {
                unique_keys.push(key);
                unique_keys.len() - 1
            })
        })
        .collect();
    log::info!(
        "Resolving {} distinct addresses of {} records",
        unique_keys.len(),
        dataset.len()
    );

    let resolutions = resolver.resolve_all(&unique_keys);
    debug_assert_eq!(resolutions.len(), unique_keys.len());

    let mut report = EnrichmentReport {
        records: dataset.len(),
        unique_addresses: unique_keys.len(),
        ..Default::default()
    };
    for ((record, addr), idx) in dataset
        .records_mut()
        .iter_mut()
        .zip(&addresses)
        .zip(record_keys)
    {
        let resolution = resolutions[idx];
        match resolution {
            Resolution::Primary(_) => report.primary += 1,
            Resolution::Secondary(_) => report.secondary += 1,
            Resolution::Placeholder(_) => {
                report.placeholder += 1;
                report.failures.push(Failure {
                    company: record.get(&columns.company).unwrap_or_default().to_string(),
                    city: addr.city.clone().unwrap_or_default(),
                    state: addr.state.clone().unwrap_or_default(),
                    zip: addr.zip.clone().unwrap_or_default(),
                });
            }
        }
        record.set_location(resolution.pos(), location_label(addr));
    }
    report
}
