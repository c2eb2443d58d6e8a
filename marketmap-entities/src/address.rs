#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street : Option<String>,
    pub city   : Option<String>,
    pub state  : Option<String>,
    pub zip    : Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.state.is_none() && self.zip.is_none()
    }
}

/// Normalized lookup key of an [`Address`].
///
/// Two records that share the same key are resolved only once.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AddressKey {
    /// The street line or, if missing, the city.
    pub address : String,
    pub city    : String,
    pub state   : String,
    pub zip     : String,
}

impl AddressKey {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.city.is_empty() && self.state.is_empty() && self.zip.is_empty()
    }

    /// The key contains a street line that differs from the city.
    pub fn has_street(&self) -> bool {
        !self.address.is_empty() && self.address != self.city
    }
}

impl std::fmt::Display for AddressKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let parts = [&self.address, &self.city, &self.state, &self.zip];
        let mut first = true;
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}
