use scraper::{ElementRef, Html, Selector};

use crate::{
    error::{WatchError, WatchResult},
    navigator::TableRow,
};

pub const ROW_SELECTOR: &str = "tr";
pub const CELL_SELECTOR: &str = "td.align-middle";

pub fn extract_text(node: ElementRef) -> String {
    node.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn selector(css: &str) -> WatchResult<Selector> {
    Selector::parse(css).map_err(|e| WatchError::Navigation(format!("bad selector `{css}`: {e}")))
}

/// Reads the schedule table out of a rendered page. The first `tr` is the
/// header and is dropped; `index` counts the remaining rows from 0.
pub fn extract_schedule_rows(html: &str) -> WatchResult<Vec<TableRow>> {
    let row_selector = selector(ROW_SELECTOR)?;
    let cell_selector = selector(CELL_SELECTOR)?;
    let document = Html::parse_document(html);

    let rows = document
        .select(&row_selector)
        .skip(1)
        .enumerate()
        .map(|(index, row)| {
            let cells = row.select(&cell_selector).map(extract_text).collect();
            TableRow::new(index, cells)
        })
        .collect();
    Ok(rows)
}
