//! Extractor: fetches the standings page and turns its table into a
//! [`Snapshot`].
//!
//! Uses reqwest for HTTP and the scraper crate for HTML parsing. Note that
//! non-2xx responses are not treated as fetch failures: any returned body is
//! handed to the parser, and a missing table surfaces as a parse error.

mod table;

use std::time::Duration;

use scraper::Html;
use tracing::{debug, info, warn};

use crate::error::{ScrapeError, ScrapeResult};
use crate::snapshot::Snapshot;

/// Standings page scraper holding the shared HTTP client.
pub struct Scraper {
    client: reqwest::Client,
}

impl Scraper {
    pub fn new() -> ScrapeResult<Self> {
        // Use a browser-like User-Agent to avoid bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.5".parse().unwrap(),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL. Any response body is returned, even for
    /// error statuses; only transport failures are errors.
    async fn fetch_html(&self, url: &str) -> ScrapeResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "non-success response, parsing body anyway");
        }

        response
            .text()
            .await
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })
    }

    /// Fetch the standings page and extract a snapshot.
    pub async fn scrape(&self, url: &str) -> ScrapeResult<Snapshot> {
        debug!(url = %url, "fetching standings page");
        let html = self.fetch_html(url).await?;
        info!(url = %url, bytes = html.len(), "fetched standings page");

        extract(&html)
    }
}

/// Extract a snapshot from raw markup: locate the first table, derive the
/// column schema from its header, then extract every body row in standings
/// order. Any malformed row aborts the extraction.
pub fn extract(html: &str) -> ScrapeResult<Snapshot> {
    let document = Html::parse_document(html);
    let standings = table::locate_table(&document)?;

    let schema = table::derive_columns(standings)?;
    let handles = table::select_rows(standings);

    let mut rows = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        rows.push(table::extract_row(handle, index)?);
    }
    info!(rows = rows.len(), "extracted standings rows");

    Ok(Snapshot { schema, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{StatValue, COLUMN_COUNT};

    const CLUBS: [&str; 20] = [
        "Arsenal",
        "Aston Villa",
        "Bournemouth",
        "Brentford",
        "Brighton and Hove Albion",
        "Burnley",
        "Chelsea",
        "Crystal Palace",
        "Everton",
        "Fulham",
        "Liverpool",
        "Luton Town",
        "Manchester City",
        "Manchester United",
        "Newcastle United",
        "Nottingham Forest",
        "Sheffield United",
        "Tottenham Hotspur",
        "West Ham United",
        "Wolverhampton Wanderers",
    ];

    fn standings_page(clubs: &[&str]) -> String {
        let header = "<thead><tr>\
            <th>Position</th><th>Club</th><th>Played</th><th>Won</th>\
            <th>Drawn</th><th>Lost</th><th>GF</th><th>GA</th>\
            <th>GD\nGoal Difference</th><th>Points</th>\
            <th>Form</th><th>Next</th><th>More</th>\
            </tr></thead>";

        let mut body = String::from("<tbody>");
        for (i, club) in clubs.iter().enumerate() {
            let position = i + 1;
            let previous = if position == 1 { clubs.len() } else { position - 1 };
            let gd = 40 - (position as i64) * 4;
            body.push_str(&format!(
                "<tr>\
                 <td>{pos} <span class=\"visually-hidden\">Previous Position {prev}</span></td>\
                 <td>{club}</td>\
                 <td>24</td><td>16</td><td>5</td><td>3</td>\
                 <td>55</td><td>23</td><td>{gd}</td><td>53</td>\
                 </tr>\
                 <tr class=\"league-table__expandable expandable\">\
                 <td colspan=\"10\">recent results</td>\
                 </tr>",
                pos = position,
                prev = previous,
                club = club,
                gd = gd,
            ));
        }
        body.push_str("</tbody>");

        format!(
            "<html><body><table class=\"league-table\">{}{}</table></body></html>",
            header, body
        )
    }

    #[test]
    fn full_table_yields_one_record_per_club() {
        let snapshot = extract(&standings_page(&CLUBS)).unwrap();

        assert_eq!(snapshot.row_count(), 20);
        assert_eq!(snapshot.schema.len(), COLUMN_COUNT);
        for (i, row) in snapshot.rows.iter().enumerate() {
            assert_eq!(row.values().len(), COLUMN_COUNT);
            // standings order: 1st place first
            assert_eq!(row.values()[0], StatValue::Int(i as i64 + 1));
            // the team cell keeps only its first token
            let first_token = CLUBS[i].split_whitespace().next().unwrap();
            assert_eq!(row.values()[2], StatValue::Text(first_token.to_string()));
        }
    }

    #[test]
    fn multi_word_team_names_keep_the_first_token() {
        let snapshot = extract(&standings_page(&CLUBS)).unwrap();
        // "Aston Villa" contributes token 0 of its cell, nothing more
        assert_eq!(
            snapshot.rows[1].values()[2],
            StatValue::Text("Aston".to_string())
        );
        assert_eq!(
            snapshot.rows[12].values()[2],
            StatValue::Text("Manchester".to_string())
        );
    }

    #[test]
    fn negative_goal_difference_is_typed() {
        let snapshot = extract(&standings_page(&CLUBS)).unwrap();
        // 20th place has gd 40 - 80 = -40
        assert_eq!(snapshot.rows[19].values()[9], StatValue::Int(-40));
    }

    #[test]
    fn document_without_table_fails() {
        assert!(matches!(
            extract("<html><body>maintenance</body></html>"),
            Err(ScrapeError::Parse(_))
        ));
    }

    #[test]
    fn smaller_leagues_extract_too() {
        let clubs = &CLUBS[..12];
        let snapshot = extract(&standings_page(clubs)).unwrap();
        assert_eq!(snapshot.row_count(), 12);
    }
}
