//! External office application support for text extraction.
//!
//! Word-processor and presentation documents are opened through a live
//! office application handle whose lifetime is scoped by
//! [`with_external_application`]. Opened documents are exposed as OOXML
//! packages.

pub mod application;
pub mod legacy;
pub mod package;
pub mod sentinel;

pub use application::{ApplicationKind, OfficeApplication, OfficeLauncher};
pub use package::{local_name, OoxmlPackage, Relationship};
pub use sentinel::with_external_application;
