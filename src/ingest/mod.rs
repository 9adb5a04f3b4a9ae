//! Upload ingestion: CSV reading, column mapping and schema normalization

pub mod columns;
pub mod csv_loader;
pub mod normalizer;

pub use columns::{column_names, resolve_depth_column, ColumnMap};
pub use csv_loader::{read_table, ParsedUpload, Upload, UploadDigest, UploadInfo};
pub use normalizer::{
    build_timestamp, derive_screen_utilization, normalize, sort_by_timestamp, NormalizerOptions,
};
