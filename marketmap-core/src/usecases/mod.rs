mod enrich_dataset;
mod normalize_address;
mod resolve_coordinates;


pub use self::{enrich_dataset::*, normalize_address::*, resolve_coordinates::*};

mod prelude {
    pub use crate::{entities::*, gateways::geocode::GeoCodingGateway};
}
