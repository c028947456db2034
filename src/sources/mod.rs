//! Site adapters with conditional compilation support.
//!
//! Each source is behind its own feature flag, so a build can include only
//! the sites it needs:
//!
//! - `source-bainian` - Enables [`BainianManga`]
//! - `source-lelmangavf` - Enables [`Lelmangavf`]
//! - `all-sources` - Enables all sources (default)
//!
//! Build with only Lelmangavf support:
//! ```bash
//! cargo build --no-default-features --features source-lelmangavf
//! ```
//!
//! Every adapter is split into a `parser` module of pure functions over a
//! parsed document and the [`Source`](crate::Source) implementation that
//! sequences the requests.

#[cfg(feature = "source-bainian")]
pub mod bainian;

#[cfg(feature = "source-lelmangavf")]
pub mod lelmangavf;

#[cfg(feature = "source-bainian")]
pub use bainian::BainianManga;

#[cfg(feature = "source-lelmangavf")]
pub use lelmangavf::Lelmangavf;
