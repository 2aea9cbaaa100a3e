use std::borrow::Cow;

use courseplan_core::DeliveryRecord;

use super::DELIVERY_COLUMNS;

/// Render records as CSV text, header first.
///
/// Rows are joined with `\n` and carry no trailing newline. A field is
/// wrapped in double quotes, with embedded quotes doubled, only when it
/// contains a comma, a double quote, or a newline.
///
/// # Examples
/// ```
/// use courseplan_core::{DeliveryPoint, DeliveryRecord};
/// use courseplan_data::csv::render_delivery_csv;
///
/// let records = [DeliveryRecord::new(
///     1,
///     DeliveryPoint::new("2", "Sato, Ltd", "C-9", "Osaka", 1500.0),
/// )];
/// assert_eq!(
///     render_delivery_csv(&records),
///     "course_number,customer_name,customer_code,address,sales\n\
///      2,\"Sato, Ltd\",C-9,Osaka,1500"
/// );
/// ```
pub fn render_delivery_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a DeliveryRecord>,
{
    let mut lines = vec![DELIVERY_COLUMNS.join(",")];
    for record in records {
        let point = &record.point;
        let sales = point.sales.to_string();
        let fields = [
            escape_field(&point.course_number),
            escape_field(&point.customer_name),
            escape_field(&point.customer_code),
            escape_field(&point.address),
            escape_field(&sales),
        ];
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Download file name for an export of one course, or of every course.
///
/// Letters and digits from any script are kept, as are `-` and `_`. Path
/// separators, punctuation and control characters become `_`.
pub fn export_file_name(course_number: Option<&str>) -> String {
    match course_number {
        Some(course) => {
            let safe: String = course
                .chars()
                .map(|ch| {
                    if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                        ch
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("course_{safe}_data.csv")
        }
        None => "all_delivery_data.csv".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseplan_core::DeliveryPoint;
    use rstest::rstest;

    fn record(id: u64, name: &str, sales: f64) -> DeliveryRecord {
        DeliveryRecord::new(id, DeliveryPoint::new("1", name, "C-1", "Tokyo", sales))
    }

    #[rstest]
    fn empty_export_is_header_only() {
        let records: Vec<DeliveryRecord> = Vec::new();
        assert_eq!(
            render_delivery_csv(&records),
            "course_number,customer_name,customer_code,address,sales"
        );
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a,b", "\"a,b\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case("two\nlines", "\"two\nlines\"")]
    #[case("", "")]
    fn quotes_only_when_needed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_field(raw), expected);
    }

    #[rstest]
    #[case(100.0, "100")]
    #[case(12.5, "12.5")]
    #[case(0.0, "0")]
    fn sales_use_shortest_representation(#[case] sales: f64, #[case] expected: &str) {
        let csv = render_delivery_csv(&[record(1, "Tanaka", sales)]);
        let last = csv.lines().last().expect("data row");
        assert!(last.ends_with(&format!(",{expected}")), "row was {last}");
    }

    #[rstest]
    #[case(Some("3"), "course_3_data.csv")]
    #[case(Some("east/1"), "course_east_1_data.csv")]
    #[case(Some("北1"), "course_北1_data.csv")]
    #[case(Some("南1"), "course_南1_data.csv")]
    #[case(Some("..\\x:1"), "course___x_1_data.csv")]
    #[case(None, "all_delivery_data.csv")]
    fn file_names(#[case] course: Option<&str>, #[case] expected: &str) {
        assert_eq!(export_file_name(course), expected);
    }
}
