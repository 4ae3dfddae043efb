//! Site harvesting — product enumeration and firmware link extraction.
//!
//! The harvest pipeline is strictly sequential: the listing page yields
//! product pages, each product page yields archive links, each archive link
//! is retrieved exactly once. Page-level failures are typed so the runner
//! can record them without aborting the run.

pub mod error;
pub mod harvester;
pub mod links;
pub mod profile;
pub mod runner;

pub use error::HarvestError;
pub use harvester::Harvester;
pub use profile::SiteProfile;
pub use runner::{MirrorRunner, RunReport};
