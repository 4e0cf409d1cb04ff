mod compute_viewport;
mod group_users;
mod resolve_address;
mod resolve_groups;
mod resolve_users;

#[cfg(test)]
pub mod tests;

pub use self::{
    compute_viewport::*, group_users::*, resolve_address::*, resolve_groups::*, resolve_users::*,
};
