mod policy;
#[cfg(test)]
mod policy_test;
mod token;

pub use policy::{AccessPolicy, LabelMatch};
pub use token::{RoleClaims, TokenCredentials};
