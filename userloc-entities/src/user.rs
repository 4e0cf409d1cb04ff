use strum::{Display, EnumString};

use crate::address::AddressFragments;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id      : String,
    pub name    : String,
    pub email   : String,
    pub address : AddressFragments,
    pub role    : Role,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Guest,
    User,
    Admin,
}
