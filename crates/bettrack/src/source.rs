//! Turning a history page into raw rows.
//!
//! The page is the source collaborator: each `<tr class="bg-dark-3">`
//! carries two currency cells, a status heading and optional game / slip id /
//! date cells. Input is either a saved snapshot file or the live page
//! fetched over HTTP. The site only renders the table for a logged-in
//! session, so snapshots are the reliable path.

use std::path::Path;

use anyhow::{Context, Result};

use crate::html;

/// Class marker on history rows.
const ROW_CLASS: &str = "bg-dark-3";
/// Attribute marking the bet and profit cells, in that order.
const CURRENCY_MARKER: &str = "data-testid=\"currency-value\"";

/// One table row reduced to the cells the extractor cares about.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// Ordered currency-value cell texts: `[bet, raw profit, ...]`.
    pub currency_cells: Vec<String>,
    /// Status heading text, if the row has one.
    pub status: Option<String>,
    /// Match label.
    pub game: Option<String>,
    /// Slip id cell text.
    pub slip_id: Option<String>,
    /// Raw date cell text.
    pub created: Option<String>,
}

/// Collect every history row from page markup.
pub fn rows_from_html(page: &str) -> Vec<RawRow> {
    html::blocks(page, "tr")
        .into_iter()
        .filter(|row| html::open_tag(row).contains(ROW_CLASS))
        .map(parse_row)
        .collect()
}

fn parse_row(row: &str) -> RawRow {
    let currency_cells = html::marked_texts(row, CURRENCY_MARKER);
    let status = html::class_text(row, "h4", "capitalize");
    let game = html::class_text(row, "h4", "text-light-1");

    let cells = html::blocks(row, "td");

    // Slip id lives in the second column's <p>; some layouts use a
    // size-medium paragraph instead.
    let slip_id = cells
        .get(1)
        .and_then(|td| html::first_block_text(td, "p"))
        .filter(|s| !s.is_empty())
        .or_else(|| html::class_text(row, "p", "size-medium"));

    // Created date is the second-to-last column's <p>.
    let created = cells
        .len()
        .checked_sub(2)
        .and_then(|i| cells.get(i))
        .and_then(|td| html::first_block_text(td, "p"));

    RawRow {
        currency_cells,
        status,
        game,
        slip_id,
        created,
    }
}

/// Read a saved page snapshot from disk.
pub fn rows_from_file(path: &Path) -> Result<Vec<RawRow>> {
    let page = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    Ok(rows_from_html(&page))
}

/// Fetch the live history page and collect its rows.
pub async fn rows_from_url(url: &str) -> Result<Vec<RawRow>> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header("Accept", "text/html")
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("History page returned status: {}", response.status());
    }

    let page = response.text().await?;
    Ok(rows_from_html(&page))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = r#"
        <tr class="bg-dark-3 hover">
          <td><h4 class="text-light-1">Team A vs Team B</h4></td>
          <td><p>1234567</p></td>
          <td><span data-testid="currency-value"> 25.00</span></td>
          <td><span data-testid="currency-value">45.50</span></td>
          <td><h4 class="size-small capitalize">Won</h4></td>
          <td><p>Sat 06 Sep 21:03</p></td>
          <td><button>View</button></td>
        </tr>"#;

    #[test]
    fn test_parse_row_fields() {
        let rows = rows_from_html(ROW);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.currency_cells, vec!["25.00", "45.50"]);
        assert_eq!(row.status.as_deref(), Some("Won"));
        assert_eq!(row.game.as_deref(), Some("Team A vs Team B"));
        assert_eq!(row.slip_id.as_deref(), Some("1234567"));
        assert_eq!(row.created.as_deref(), Some("Sat 06 Sep 21:03"));
    }

    #[test]
    fn test_unmarked_rows_ignored() {
        let page = format!("<tr class=\"header-row\"><td>Game</td></tr>{ROW}");
        assert_eq!(rows_from_html(&page).len(), 1);
    }
}
