//! Persistence for digests: ledger, snapshots, statistics and index.
//!
//! # Submodules
//!
//! - [`ledger`]: Append-only CSV ledger of every news item
//! - [`json`]: One JSON snapshot per digest date
//! - [`stats`]: Counts derived by scanning the ledger
//! - [`indexes`]: Summary index combining snapshot dates and ledger statistics
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! ├── news.csv          # ledger, appended on every ingest
//! ├── index.json        # rebuilt on every ingest
//! └── daily/
//!     └── 2024-12-09.json
//! ```

pub mod indexes;
pub mod json;
pub mod ledger;
pub mod stats;
