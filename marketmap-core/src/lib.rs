pub mod gateways;
pub mod usecases;

pub mod entities {
    pub use marketmap_entities::{address::*, dataset::*, geo::*, record::*};
}
