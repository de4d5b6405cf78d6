//! Smoke test: run the full capture pipeline against a page fixture.

use bettrack::aggregate::monthly_breakdown;
use bettrack::capture::capture_rows;
use bettrack::source::rows_from_html;
use bettrack::store::{LedgerStore, MemoryStore};
use chrono::{TimeZone, Utc};

/// A trimmed-down history page: three settled slips, one open slip and one
/// row without a slip id.
const PAGE: &str = r#"
<table>
  <tr class="header"><td>Game</td><td>Slip</td><td>Bet</td><td>Profit</td><td>Status</td><td>Date</td><td></td></tr>
  <tr class="bg-dark-3">
    <td><h4 class="text-light-1">Team A vs Team B</h4></td>
    <td><p>1111</p></td>
    <td><span data-testid="currency-value">&nbsp;25.00</span></td>
    <td><span data-testid="currency-value">45.50</span></td>
    <td><h4 class="size-small capitalize">Won</h4></td>
    <td><p>Sat 06 Sep 21:03</p></td>
    <td><button>View</button></td>
  </tr>
  <tr class="bg-dark-3">
    <td><h4 class="text-light-1">Team C vs Team D</h4></td>
    <td><p>2222</p></td>
    <td><span data-testid="currency-value">10.00</span></td>
    <td><span data-testid="currency-value">0.00</span></td>
    <td><h4 class="size-small capitalize">Lost</h4></td>
    <td><p>Sun 07 Sep 09:15</p></td>
    <td><button>View</button></td>
  </tr>
  <tr class="bg-dark-3">
    <td><h4 class="text-light-1">Team E vs Team F</h4></td>
    <td><p>3333</p></td>
    <td><span data-testid="currency-value">5.00</span></td>
    <td><span data-testid="currency-value">0.00</span></td>
    <td><h4 class="size-small capitalize">Cancelled</h4></td>
    <td><p>Wed 01 Oct 10:00</p></td>
    <td><button>View</button></td>
  </tr>
  <tr class="bg-dark-3">
    <td><h4 class="text-light-1">Team G vs Team H</h4></td>
    <td><p>4444</p></td>
    <td><span data-testid="currency-value">7.50</span></td>
    <td><span data-testid="currency-value">0.00</span></td>
    <td><h4 class="size-small capitalize">Open</h4></td>
    <td><p>Wed 01 Oct 11:00</p></td>
    <td><button>View</button></td>
  </tr>
  <tr class="bg-dark-3">
    <td><h4 class="text-light-1">Team I vs Team J</h4></td>
    <td></td>
    <td><span data-testid="currency-value">3.00</span></td>
    <td><span data-testid="currency-value">0.00</span></td>
    <td><h4 class="size-small capitalize">Lost</h4></td>
    <td><p>Wed 01 Oct 12:00</p></td>
    <td><button>View</button></td>
  </tr>
</table>
"#;

#[tokio::test]
async fn capture_merges_and_aggregates_fixture() {
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 14, 0, 0).unwrap();
    let rows = rows_from_html(PAGE);
    assert_eq!(rows.len(), 5, "header row must not count");

    let store = MemoryStore::new();
    let report = capture_rows(&store, &rows, now).await.unwrap();

    // Three settled slips land; open and id-less rows are skipped but counted.
    assert_eq!(report.new_records, 3);
    assert_eq!(report.updated_records, 0);
    assert_eq!(report.total_records, 3);
    assert_eq!(report.skipped.unsettled_status, 1);
    assert_eq!(report.skipped.missing_slip_id, 1);

    // Status totals over the merged collection
    let won = report.totals.get("won").unwrap();
    assert_eq!((won.bet_total, won.profit_total, won.count), (25.0, 45.5, 1));
    let lost = report.totals.get("lost").unwrap();
    assert_eq!((lost.bet_total, lost.profit_total, lost.count), (10.0, -10.0, 1));
    assert_eq!(report.totals.total.count, 3);
    assert_eq!(report.totals.total.bet_total, 40.0);
    assert_eq!(report.totals.total.profit_total, 35.5);

    // Second capture of the same page is idempotent
    let again = capture_rows(&store, &rows, now).await.unwrap();
    assert_eq!(again.new_records, 0);
    assert_eq!(again.updated_records, 3);
    assert_eq!(again.total_records, 3);

    // Monthly breakdown buckets by the slips' own dates, newest first
    let records = store.load_all().await.unwrap();
    let months = monthly_breakdown(&records, now, false);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month_key, "2025-10");
    assert_eq!(months[0].cancelled.count, 1);
    assert_eq!(months[1].month_key, "2025-09");
    assert_eq!(months[1].totals.count, 2);
    assert_eq!(months[1].won.count, 1);
    assert_eq!(months[1].lost.count, 1);
    assert_eq!(months[1].totals.profit_total, 35.5);

    println!("✓ Captured {} slips across {} months", records.len(), months.len());
}

#[tokio::test]
async fn clear_all_empties_the_collection() {
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 14, 0, 0).unwrap();
    let rows = rows_from_html(PAGE);

    let store = MemoryStore::new();
    capture_rows(&store, &rows, now).await.unwrap();
    assert!(!store.load_all().await.unwrap().is_empty());

    store.clear_all().await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());

    // A capture after clearing starts from scratch
    let report = capture_rows(&store, &rows, now).await.unwrap();
    assert_eq!(report.new_records, 3);
}
