use courseplan_core::DeliveryPoint;
use thiserror::Error;

use super::{DELIVERY_COLUMNS, trim_field};

/// Errors raised while parsing uploaded CSV content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvImportError {
    /// Fewer than two non-blank lines were present.
    #[error("CSV file is empty or contains only headers")]
    EmptyOrHeaderOnly,
    /// Required columns were absent from the header row.
    #[error("missing required headers: {}", missing.join(", "))]
    MissingHeaders {
        /// Absent column names, in canonical column order.
        missing: Vec<String>,
    },
}

/// Position of each required column within a data row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    course_number: usize,
    customer_name: usize,
    customer_code: usize,
    address: usize,
    sales: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[&str]) -> Result<Self, CsvImportError> {
        // Later duplicates overwrite earlier ones when a row is projected
        // onto header names, so the last matching column wins.
        let position = |name: &str| headers.iter().rposition(|header| *header == name);

        let missing: Vec<String> = DELIVERY_COLUMNS
            .iter()
            .copied()
            .filter(|&name| position(name).is_none())
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Err(CsvImportError::MissingHeaders { missing });
        }

        let require = |name: &str| {
            position(name).ok_or_else(|| CsvImportError::MissingHeaders {
                missing: vec![name.to_owned()],
            })
        };
        Ok(Self {
            course_number: require("course_number")?,
            customer_name: require("customer_name")?,
            customer_code: require("customer_code")?,
            address: require("address")?,
            sales: require("sales")?,
        })
    }

    fn project(&self, values: &[&str]) -> DeliveryPoint {
        let value = |index: usize| values.get(index).copied().unwrap_or_default();
        DeliveryPoint {
            course_number: value(self.course_number).to_owned(),
            customer_name: value(self.customer_name).to_owned(),
            customer_code: value(self.customer_code).to_owned(),
            address: value(self.address).to_owned(),
            sales: parse_sales(value(self.sales)),
        }
    }
}

/// Parse uploaded CSV text into delivery points.
///
/// Lines are separated by `\n`; blank lines anywhere in the file are
/// discarded before the header is read. Rows are mapped onto the header
/// names by position, with missing trailing values read as empty strings.
///
/// # Examples
/// ```
/// use courseplan_data::csv::parse_delivery_csv;
///
/// let content = "sales,address,course_number,customer_code,customer_name,region\n\
///                1200,Tokyo,3,C-1,Tanaka,east\n\
///                \n\
///                n/a,Osaka,4,C-2,Sato,west\n";
/// let points = parse_delivery_csv(content)?;
///
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0].course_number, "3");
/// assert_eq!(points[0].sales, 1200.0);
/// assert_eq!(points[1].sales, 0.0);
/// # Ok::<(), courseplan_data::csv::CsvImportError>(())
/// ```
pub fn parse_delivery_csv(content: &str) -> Result<Vec<DeliveryPoint>, CsvImportError> {
    let lines: Vec<&str> = content
        .split('\n')
        .filter(|line| !trim_field(line).is_empty())
        .collect();
    let Some((header, rows)) = lines.split_first() else {
        return Err(CsvImportError::EmptyOrHeaderOnly);
    };
    if rows.is_empty() {
        return Err(CsvImportError::EmptyOrHeaderOnly);
    }

    let headers = split_line(header);
    let columns = ColumnIndex::from_headers(&headers)?;
    Ok(rows
        .iter()
        .map(|row| columns.project(&split_line(row)))
        .collect())
}

fn split_line(line: &str) -> Vec<&str> {
    line.split(',').map(trim_field).collect()
}

/// Sales amounts are non-negative and finite; anything else reads as zero.
fn parse_sales(value: &str) -> f64 {
    parse_leading_float(value)
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .map_or(0.0, f64::abs)
}

/// Parse the longest decimal prefix of `value`.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"12.5kg"`
/// reads as `12.5`. `Infinity` with an optional sign is recognised. Returns
/// `None` when no digits lead the input.
///
/// # Examples
/// ```
/// use courseplan_data::csv::parse_leading_float;
///
/// assert_eq!(parse_leading_float(" 12.5kg"), Some(12.5));
/// assert_eq!(parse_leading_float("1e3"), Some(1000.0));
/// assert_eq!(parse_leading_float(".5"), Some(0.5));
/// assert_eq!(parse_leading_float("abc"), None);
/// ```
pub fn parse_leading_float(value: &str) -> Option<f64> {
    let trimmed = value.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}');
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if trimmed[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let integer_digits = count_digits(&bytes[end..]);
    end += integer_digits;
    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[end + 1..]);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits == 0 && fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_end..]);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    trimmed[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}
