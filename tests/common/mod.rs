pub mod fixtures;
pub mod site;

pub use site::TestSite;
