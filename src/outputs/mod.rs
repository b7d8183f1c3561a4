//! Output generation for a finished digest.
//!
//! - [`document`]: paginated Markdown document, the file that gets mailed
//! - [`json`]: machine-readable copy of the same records
//!
//! ```text
//! output_dir/
//! ├── news_summary_20250506.md
//! └── 20250506/
//!     └── news_summary.json
//! ```

pub mod document;
pub mod json;
