pub mod identity;
pub mod version;

pub use identity::{PackageDescriptor, canonical_id, denormalize, package_filename};
pub use version::{VersionComparator, VersionSpec};
