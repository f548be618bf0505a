use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{RawRow, ScrapeError};

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
    static ref TABLE_SELECTOR: Selector = Selector::parse("table").unwrap();
    static ref ROW_SELECTOR: Selector = Selector::parse("table tbody tr").unwrap();
    static ref CELL_SELECTOR: Selector = Selector::parse("td").unwrap();
}

/// Trim, collapse inner whitespace and strip thousands separators
pub fn clean_cell(text: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(text.trim(), " ")
        .replace(',', "")
}

/// Extract every body row of every table in the rendered page.
///
/// Cells are returned in column order. Header cells (`th`) are not part of
/// the output; rows made only of headers come back empty and are left for the
/// normalizer to skip.
pub fn extract_table_rows(html: &str) -> Result<Vec<RawRow>, ScrapeError> {
    let document = Html::parse_document(html);

    if document.select(&TABLE_SELECTOR).next().is_none() {
        return Err(ScrapeError::SelectorNotFound(
            "no <table> element in rendered page".to_string(),
        ));
    }

    let rows = document
        .select(&ROW_SELECTOR)
        .map(|row| row.select(&CELL_SELECTOR).map(cell_text).collect())
        .collect();

    Ok(rows)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    clean_cell(&cell.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE_TABLE: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>구분</th><th>단위</th><th>가격</th></tr></thead>
          <tbody>
            <tr><td>평균</td><td> 48,500 </td><td></td></tr>
            <tr><td>서울</td><td>20kg</td><td>49,000</td></tr>
            <tr><td>
                부산
            </td><td>20kg</td><td>47,900</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  49,000 "), "49000");
        assert_eq!(clean_cell("\n서울\t"), "서울");
        assert_eq!(clean_cell("1,234,567"), "1234567");
        assert_eq!(clean_cell("   "), "");
    }

    #[test]
    fn test_extract_table_rows() {
        let rows = extract_table_rows(PRICE_TABLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["평균", "48500", ""]);
        assert_eq!(rows[1], vec!["서울", "20kg", "49000"]);
        assert_eq!(rows[2], vec!["부산", "20kg", "47900"]);
    }

    #[test]
    fn test_missing_table_is_scrape_error() {
        let result = extract_table_rows("<html><body><p>점검 중</p></body></html>");
        assert!(matches!(result, Err(ScrapeError::SelectorNotFound(_))));
    }

    #[test]
    fn test_implicit_tbody() {
        // html5ever wraps bare rows in an implicit tbody
        let rows = extract_table_rows("<table><tr><td>평균</td><td>1</td></tr></table>").unwrap();
        assert_eq!(rows, vec![vec!["평균".to_string(), "1".to_string()]]);
    }
}
