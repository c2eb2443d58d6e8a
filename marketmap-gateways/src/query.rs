use itertools::Itertools;
use marketmap_core::entities::AddressKey;

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts.into_iter().filter(|p| !p.is_empty()).join(sep)
}

/// Free-text queries for an address, from the most to the least specific.
///
/// The street line is only included if it differs from the city.
pub fn forward_queries(key: &AddressKey) -> Vec<String> {
    let city_state = join_non_empty([key.city.as_str(), key.state.as_str()], ", ");
    let mut queries = Vec::with_capacity(3);
    if key.has_street() {
        queries.push(join_non_empty(
            [
                key.address.as_str(),
                key.city.as_str(),
                key.state.as_str(),
                key.zip.as_str(),
            ],
            ", ",
        ));
    }
    if !key.zip.is_empty() {
        queries.push(join_non_empty([city_state.as_str(), key.zip.as_str()], " "));
    }
    queries.push(city_state);
    queries.retain(|q| !q.is_empty());
    queries.dedup();
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(address: &str, city: &str, state: &str, zip: &str) -> AddressKey {
        AddressKey {
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    #[test]
    fn queries_with_street_and_zip() {
        let queries = forward_queries(&key("1 MAIN ST", "SPRINGFIELD", "IL", "62701"));
        assert_eq!(
            queries,
            [
                "1 MAIN ST, SPRINGFIELD, IL, 62701",
                "SPRINGFIELD, IL 62701",
                "SPRINGFIELD, IL",
            ]
        );
    }

    #[test]
    fn skip_street_that_equals_the_city() {
        let queries = forward_queries(&key("SPRINGFIELD", "SPRINGFIELD", "IL", ""));
        assert_eq!(queries, ["SPRINGFIELD, IL"]);
    }

    #[test]
    fn queries_with_partial_address() {
        assert_eq!(forward_queries(&key("", "", "IL", "62701")), ["IL 62701", "IL"]);
        assert!(forward_queries(&AddressKey::default()).is_empty());
    }
}
