use crate::core::models::Call;
use crate::providers::CallSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

// The legacy scraper had no deadline at all; a hung dashboard wedged the
// whole poll loop. 30 seconds keeps slow sites working while bounding that.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Scrapes the "last heard" table from the repeater dashboard page.
pub struct DashboardSource {
    client: reqwest::Client,
    page: String,
}

impl DashboardSource {
    pub fn new(page: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build dashboard HTTP client")?;

        Ok(Self { client, page })
    }
}

#[async_trait]
impl CallSource for DashboardSource {
    async fn fetch_calls(&self) -> Result<Vec<Call>> {
        let response = self
            .client
            .get(&self.page)
            .send()
            .await
            .context("Failed to fetch dashboard page")?;

        if !response.status().is_success() {
            anyhow::bail!("Dashboard returned {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read dashboard body")?;

        Ok(parse_calls(&html))
    }
}

/// Extract call rows from the dashboard HTML. Column positions are fixed by
/// the dashboard layout: 1 = num, 3 = date, 4 = sec, 7 = id, 8 = call,
/// 10 = slot, 11 = talkgroup. Rows with an empty first cell are decoration.
fn parse_calls(html: &str) -> Vec<Call> {
    let doc = Html::parse_document(html);

    let row = Selector::parse("table > tbody > tr").unwrap();
    let cells: Vec<Selector> = [1, 3, 4, 7, 8, 10, 11]
        .iter()
        .map(|n| Selector::parse(&format!("td:nth-child({n})")).unwrap())
        .collect();

    let cell_text = |el: scraper::ElementRef<'_>, sel: &Selector| -> String {
        el.select(sel)
            .next()
            .map(|td| td.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    };

    doc.select(&row)
        .filter_map(|tr| {
            let num = cell_text(tr, &cells[0]);
            if num.is_empty() {
                return None;
            }
            Some(Call {
                num,
                date: cell_text(tr, &cells[1]),
                name: String::new(),
                call: cell_text(tr, &cells[4]),
                id: cell_text(tr, &cells[3]),
                sec: cell_text(tr, &cells[2]),
                slot: cell_text(tr, &cells[5]),
                talkgroup: cell_text(tr, &cells[6]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><body><table><tbody>
            <tr>
                <td>1</td><td>x</td><td>2024-01-01 12:00:00</td><td>Site A</td>
                <td>x</td><td>x</td><td>3100001</td><td>W1AW</td>
                <td>x</td><td>2</td><td>TG 91</td>
            </tr>
            <tr>
                <td></td><td></td><td></td><td></td><td></td><td></td>
                <td></td><td></td><td></td><td></td><td></td>
            </tr>
            <tr>
                <td>2</td><td>x</td><td>2024-01-01 12:01:30</td><td>Site B</td>
                <td>x</td><td>x</td><td>3100002</td><td>K2ABC</td>
                <td>x</td><td>1</td><td>TG 3100</td>
            </tr>
        </tbody></table></body></html>
    "#;

    #[test]
    fn extracts_rows_by_column_position() {
        let calls = parse_calls(SAMPLE);
        assert_eq!(calls.len(), 2);

        assert_eq!(calls[0].num, "1");
        assert_eq!(calls[0].date, "2024-01-01 12:00:00");
        assert_eq!(calls[0].sec, "Site A");
        assert_eq!(calls[0].id, "3100001");
        assert_eq!(calls[0].call, "W1AW");
        assert_eq!(calls[0].slot, "2");
        assert_eq!(calls[0].talkgroup, "TG 91");
        assert!(calls[0].name.is_empty());

        assert_eq!(calls[1].id, "3100002");
        assert_eq!(calls[1].talkgroup, "TG 3100");
    }

    #[test]
    fn rows_with_empty_first_cell_are_skipped() {
        let calls = parse_calls(SAMPLE);
        assert!(calls.iter().all(|c| !c.num.is_empty()));
    }

    #[test]
    fn pageless_html_yields_no_calls() {
        assert!(parse_calls("<html><body><p>503</p></body></html>").is_empty());
        assert!(parse_calls("").is_empty());
    }
}
