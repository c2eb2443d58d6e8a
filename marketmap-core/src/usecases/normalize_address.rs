use super::prelude::*;

const ZIP_LEN: usize = 5;

/// Build the lookup key of an address.
///
/// Unparseable input is passed through and will
/// simply not be resolved by any geocoder.
pub fn normalize_address(addr: &Address) -> AddressKey {
    let city = normalize_token(addr.city.as_deref());
    let state = normalize_token(addr.state.as_deref());
    let street = normalize_token(addr.street.as_deref());
    let address = if street.is_empty() {
        city.clone()
    } else {
        street
    };
    let zip = normalize_zip(addr.zip.as_deref().unwrap_or_default());
    AddressKey {
        address,
        city,
        state,
        zip,
    }
}

/// The human readable label of a location, e.g. `Springfield, IL`.
pub fn location_label(addr: &Address) -> String {
    [addr.city.as_deref(), addr.state.as_deref()]
        .into_iter()
        .flatten()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_token(token: Option<&str>) -> String {
    collapse_whitespace(token.unwrap_or_default()).to_uppercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_zip(zip: &str) -> String {
    let zip = zip.trim();
    if !zip.is_empty() && zip.chars().all(|c| c.is_ascii_digit()) {
        format!("{zip:0>width$}", width = ZIP_LEN)
    } else {
        zip.to_string()
    }
}
