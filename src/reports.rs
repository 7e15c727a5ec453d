//! Pure aggregation helpers behind the dashboard charts.
//!
//! Everything in this module is deterministic: callers fetch rows, project
//! them into `DatedAmount`/`CategoryAmount`, and pass the anchor date in
//! explicitly. Network and clock access stay outside.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::constants::*;
use crate::models::Category;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverviewMode {
    /// Last 7 calendar days.
    Weekly,
    /// Last 28 calendar days.
    Monthly,
    /// Last 12 calendar months.
    Yearly,
}

/// A record reduced to the two fields bucketing cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedAmount {
    pub date: Date,
    pub amount: f64,
}

/// A record reduced to the two fields the distribution cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// One bar of an overview chart.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OverviewPoint {
    pub date: String,
    pub amount: i64,
}

/// One slice of a pie/donut chart.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategorySlice {
    pub label: String,
    pub value: i64,
    pub color: String,
}

pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// "DD Mon" label for day buckets, e.g. "05 Nov".
pub fn format_day(date: Date) -> String {
    format!("{:02} {}", date.day(), month_abbrev(date.month()))
}

/// "Mon YYYY" label for month buckets, e.g. "Nov 2025".
pub fn format_month_year(year: i32, month: Month) -> String {
    format!("{} {}", month_abbrev(month), year)
}

/// Zero-filled series over the last `days` calendar days ending at `today`.
///
/// Records outside the window are dropped; an empty input still produces the
/// full series of zero bars. Amounts are rounded to the nearest integer and
/// negative sums pass through unclamped.
pub fn daily_overview(records: &[DatedAmount], days: usize, today: Date) -> Vec<OverviewPoint> {
    let start = today - Duration::days(days as i64 - 1);
    let mut sums = vec![0.0_f64; days];

    for record in records {
        let offset = (record.date - start).whole_days();
        if (0..days as i64).contains(&offset) {
            sums[offset as usize] += record.amount;
        }
    }

    sums.iter()
        .enumerate()
        .map(|(i, sum)| OverviewPoint {
            date: format_day(start + Duration::days(i as i64)),
            amount: sum.round() as i64,
        })
        .collect()
}

fn months_window(anchor: Date, n: usize) -> Vec<(i32, Month)> {
    let mut window = Vec::with_capacity(n);
    let mut year = anchor.year();
    let mut month = anchor.month();
    for _ in 0..n {
        window.push((year, month));
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    window.reverse();
    window
}

/// Zero-filled series over the 12 calendar months ending with `today`'s month.
pub fn monthly_overview(records: &[DatedAmount], today: Date) -> Vec<OverviewPoint> {
    let window = months_window(today, YEARLY_WINDOW_MONTHS);
    let mut sums = vec![0.0_f64; window.len()];

    for record in records {
        let key = (record.date.year(), record.date.month());
        if let Some(pos) = window.iter().position(|bucket| *bucket == key) {
            sums[pos] += record.amount;
        }
    }

    window
        .iter()
        .zip(sums)
        .map(|((year, month), sum)| OverviewPoint {
            date: format_month_year(*year, *month),
            amount: sum.round() as i64,
        })
        .collect()
}

pub fn overview(records: &[DatedAmount], mode: OverviewMode, today: Date) -> Vec<OverviewPoint> {
    match mode {
        OverviewMode::Weekly => daily_overview(records, WEEKLY_WINDOW_DAYS, today),
        OverviewMode::Monthly => daily_overview(records, MONTHLY_WINDOW_DAYS, today),
        OverviewMode::Yearly => monthly_overview(records, today),
    }
}

/// Groups records by category label, sums amounts, attaches the category
/// color ("#ccc" when no category matches), sorts descending and keeps the
/// top 5. Grouping preserves input-encounter order so ties stay stable.
pub fn category_distribution(
    records: &[CategoryAmount],
    categories: &[Category],
) -> Vec<CategorySlice> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for record in records {
        let label = if record.category.trim().is_empty() {
            UNCATEGORIZED_LABEL
        } else {
            record.category.as_str()
        };
        match totals.iter_mut().find(|(name, _)| name == label) {
            Some((_, sum)) => *sum += record.amount,
            None => totals.push((label.to_string(), record.amount)),
        }
    }

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .map(|(label, sum)| {
            let color = categories
                .iter()
                .find(|c| c.name == label)
                .map(|c| c.color.clone())
                .unwrap_or_else(|| FALLBACK_SLICE_COLOR.to_string());
            CategorySlice {
                label,
                value: sum.round() as i64,
                color,
            }
        })
        .collect();

    slices.sort_by(|a, b| b.value.cmp(&a.value));
    slices.truncate(TOP_SLICES);
    slices
}

/// Per-product quantity totals for the best-sellers donut, top 5.
///
/// The slice color is derived from the label so repeated renders of the same
/// product agree across requests.
pub fn best_sellers(rows: &[(String, f64)]) -> Vec<CategorySlice> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for (name, quantity) in rows {
        match totals.iter_mut().find(|(label, _)| label == name) {
            Some((_, sum)) => *sum += quantity,
            None => totals.push((name.clone(), *quantity)),
        }
    }

    let mut slices: Vec<CategorySlice> = totals
        .into_iter()
        .map(|(label, quantity)| {
            let color = vibrant_color(&label);
            CategorySlice {
                value: quantity.round() as i64,
                label,
                color,
            }
        })
        .collect();

    slices.sort_by(|a, b| b.value.cmp(&a.value));
    slices.truncate(TOP_SLICES);
    slices
}

/// FNV-hashed rgb color, channels kept in the 50..230 band with at least
/// one bright channel.
fn vibrant_color(label: &str) -> String {
    let mut hash: u32 = 2_166_136_261;
    for byte in label.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    let mut r = 50 + (hash & 0xff) % 180;
    let g = 50 + ((hash >> 8) & 0xff) % 180;
    let b = 50 + ((hash >> 16) & 0xff) % 180;
    if r.max(g).max(b) < 150 {
        r = 170 + (hash >> 24) % 80;
    }
    format!("rgb({}, {}, {})", r, g, b)
}

/// Male/Female head counts over employee rows, fixed colors and labels.
/// Other or missing gender values are not counted.
pub fn gender_distribution(genders: &[Option<String>]) -> Vec<CategorySlice> {
    let mut men = 0_i64;
    let mut women = 0_i64;
    for gender in genders.iter().flatten() {
        match gender.as_str() {
            "Male" => men += 1,
            "Female" => women += 1,
            _ => {}
        }
    }

    vec![
        CategorySlice {
            label: "Men".to_string(),
            value: men,
            color: MALE_SLICE_COLOR.to_string(),
        },
        CategorySlice {
            label: "Women".to_string(),
            value: women,
            color: FEMALE_SLICE_COLOR.to_string(),
        },
    ]
}
