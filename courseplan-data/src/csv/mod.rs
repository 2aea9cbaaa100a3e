//! CSV codec for delivery data.
//!
//! Import and export are deliberately asymmetric. The importer splits lines
//! on commas without honouring quotes, while the exporter quotes any field
//! containing a comma, double quote, or newline. Files produced by the
//! exporter re-import faithfully as long as no field needs quoting.

mod export;
mod import;

pub use export::{export_file_name, render_delivery_csv};
pub use import::{CsvImportError, parse_delivery_csv, parse_leading_float};

/// Column names shared by the importer and exporter, in export order.
pub const DELIVERY_COLUMNS: [&str; 5] = [
    "course_number",
    "customer_name",
    "customer_code",
    "address",
    "sales",
];

/// Trim whitespace and byte-order marks from both ends of a field.
fn trim_field(field: &str) -> &str {
    field.trim_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}')
}
