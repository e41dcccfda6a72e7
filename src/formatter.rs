//! Result formatter
//!
//! Renders materialized rows into a human-readable answer. Canonical
//! questions carry their intent tag from resolution; generated SQL falls
//! back to a keyword classifier over the question text, checked in a fixed
//! precedence order. Anything unclassified gets a generic row dump.

use crate::executor::Row;
use crate::registry::QueryIntent;
use tracing::debug;

/// Fixed response when a query yields nothing renderable
pub const NO_RESULTS: &str = "No results found.";

pub struct ResultFormatter;

impl ResultFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render rows for the given question. The empty-rows check precedes
    /// any classification.
    pub fn format(&self, question: &str, intent: Option<QueryIntent>, rows: &[Row]) -> String {
        if rows.is_empty() {
            return NO_RESULTS.to_string();
        }

        let intent = intent.or_else(|| Self::classify(question));
        debug!("Rendering {} rows with intent {:?}", rows.len(), intent);

        match intent {
            Some(QueryIntent::OccupancyRate) => render_occupancy(rows),
            Some(QueryIntent::TopTenants) => render_name_amount_list(
                rows,
                "Top tenants by total rent paid:",
                "Total Paid",
            ),
            Some(QueryIntent::AverageRating) => render_ratings(rows),
            Some(QueryIntent::LandlordRevenue) => render_name_amount_list(
                rows,
                "Landlords who generated the most revenue:",
                "Total Revenue",
            ),
            Some(QueryIntent::AvailableListings) => render_listings(rows),
            None => render_generic(rows),
        }
    }

    /// Fallback classifier for questions answered via generated SQL.
    /// Precedence (first match wins): occupancy rate, top tenants, average
    /// rating, landlord revenue, availability listing.
    fn classify(question: &str) -> Option<QueryIntent> {
        let text = question.to_lowercase();
        if text.contains("occupancy rate") {
            Some(QueryIntent::OccupancyRate)
        } else if text.contains("top") && text.contains("tenant") {
            Some(QueryIntent::TopTenants)
        } else if text.contains("average rating") {
            Some(QueryIntent::AverageRating)
        } else if text.contains("landlord") && text.contains("revenue") {
            Some(QueryIntent::LandlordRevenue)
        } else if text.contains("available") {
            Some(QueryIntent::AvailableListings)
        } else {
            None
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-row, single-value percentage. An absent value renders as 0.00.
fn render_occupancy(rows: &[Row]) -> String {
    let rate = rows
        .first()
        .and_then(|row| row.first())
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    format!("The occupancy rate is {:.2}%.", rate)
}

/// Name + currency amount per row, under a header line. Rows missing any
/// expected value are skipped; an entirely skipped set means no results.
fn render_name_amount_list(rows: &[Row], header: &str, amount_label: &str) -> String {
    let lines: Vec<String> = rows
        .iter()
        .filter_map(|row| {
            let first = row.first()?.as_str()?;
            let last = row.get(1)?.as_str()?;
            let amount = row.get(2)?.as_f64()?;
            Some(format!("{} {} ({}: ${:.2})", first, last, amount_label, amount))
        })
        .collect();

    if lines.is_empty() {
        return NO_RESULTS.to_string();
    }
    format!("{}\n{}", header, lines.join("\n"))
}

/// Property type + one-decimal rating per row. A present type with an
/// absent rating gets an explicit no-reviews line instead of being dropped.
fn render_ratings(rows: &[Row]) -> String {
    let lines: Vec<String> = rows
        .iter()
        .filter_map(|row| {
            let property_type = row.first()?.as_str()?;
            match row.get(1).and_then(|value| value.as_f64()) {
                Some(rating) => Some(format!(
                    "The average rating for {} is {:.1} stars.",
                    property_type, rating
                )),
                None => Some(format!("No reviews yet for {}.", property_type)),
            }
        })
        .collect();

    if lines.is_empty() {
        return NO_RESULTS.to_string();
    }
    lines.join("\n")
}

/// Title + city + monthly price per row, under a header line
fn render_listings(rows: &[Row]) -> String {
    let lines: Vec<String> = rows
        .iter()
        .filter_map(|row| {
            let title = row.first()?.as_str()?;
            let city = row.get(1)?.as_str()?;
            let price = row.get(2)?.as_f64()?;
            Some(format!("'{}' in {} for ${:.2} per month.", title, city, price))
        })
        .collect();

    if lines.is_empty() {
        return NO_RESULTS.to_string();
    }
    format!("Available 2BHKs under $2500 in London:\n{}", lines.join("\n"))
}

/// Generic dump for unclassified questions
fn render_generic(rows: &[Row]) -> String {
    let rendered: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            format!("({})", cells.join(", "))
        })
        .collect();
    format!("Query executed successfully. Results: [{}]", rendered.join(", "))
}
