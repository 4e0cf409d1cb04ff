pub mod cache;
pub mod gateways;
pub mod usecases;

pub mod entities {
    pub use userloc_entities::{
        address::*, geo::*, group::*, key::*, location::*, user::*, viewport::*,
    };
}
