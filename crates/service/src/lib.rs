//! Service layer for banner resources.
//! - `BannerRepository` abstracts the document store; the service never talks to
//!   MongoDB directly.
//! - `BannerService` validates input, assigns identity and timestamps, and maps
//!   entities to wire DTOs.
//! - Errors distinguish caller mistakes (validation, not found) from
//!   unexpected store failures.

pub mod errors;
pub mod banner;
#[cfg(test)]
pub mod test_support;
