//! Enrouten and router assembly.
//!
//! The functionality is split across submodules:
//!
//! - [`router`] - Core `Enrouten` struct and initialization
//! - [`builder`] - Assembly (`build`), `Mounted` and attachment to an application

mod builder;
mod router;

pub use builder::Mounted;
pub use router::Enrouten;

#[cfg(test)]
mod tests;
