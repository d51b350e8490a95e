//! Digest rendering: notification wording and the HTML act table.

use crate::channels::Notification;
use crate::channels::email::escape_html;
use crate::registry::{ActRecord, Period};

/// Prefix for every notification subject.
pub const SUBJECT_PREFIX: &str = "[LawDigest]";

pub const NO_ACTS_TITLE: &str = "Brak nowych aktów prawnych";

/// Shown in place of a missing date or keyword list.
const MISSING: &str = "&mdash;";

const CELL_STYLE: &str =
    "line-height: 14.4px; font-size: 12px; margin: 0; padding: 12px; border: 1px solid #e2e8f0;";
const HEADER_STYLE: &str = "line-height: 14.4px; font-size: 12px; margin: 0; padding: 12px; border-color: #e2e8f0; border-style: solid; border-width: 1px 1px 2px;";
const BUTTON_STYLE: &str = "color: #ffffff; font-size: 12px; font-family: Helvetica, Arial, sans-serif; text-decoration: none; border-radius: 6px; line-height: 20px; display: block; font-weight: normal; white-space: nowrap; background-color: #0d6efd; padding: 8px 12px; border: 1px solid #0d6efd;";

const BUTTON_BG: &str = "#0d6efd";

const HEADERS: [&str; 8] = [
    "L.p.",
    "Tytuł aktu",
    "Podsumowanie",
    "Data ogłoszenia",
    "Data wydania",
    "Data wejścia w życie",
    "Słowa kluczowe",
    "Treść aktu",
];

/// Human phrasing of the period a run covers, e.g. "w ostatnim tygodniu".
pub fn period_phrase(period: &Period) -> String {
    match period {
        Period::LastWeek => "w ostatnim tygodniu".to_string(),
        Period::CurrentMonth => "w bieżącym miesiącu".to_string(),
        Period::LastMonth => "w ostatnim miesiącu".to_string(),
        Period::Custom(range) => format!(
            "w okresie od {} do {}",
            range.from.format("%Y-%m-%d"),
            range.to.format("%Y-%m-%d")
        ),
    }
}

fn keyword_suffix(keywords: &[String]) -> String {
    if keywords.is_empty() {
        String::new()
    } else {
        format!(" (słowa kluczowe: {})", keywords.join(", "))
    }
}

/// Notice sent when the registry returned no acts. Carries no table.
pub fn no_acts_notification(period: &Period, keywords: &[String]) -> Notification {
    Notification::new(
        format!("{SUBJECT_PREFIX} {NO_ACTS_TITLE}"),
        NO_ACTS_TITLE,
        format!(
            "Brak nowych aktów prawnych, które weszły w życie {}{}.",
            period_phrase(period),
            keyword_suffix(keywords)
        ),
    )
}

/// Digest listing every act in discovery order.
pub fn digest_notification(
    period: &Period,
    keywords: &[String],
    acts: &[ActRecord],
) -> Notification {
    let phrase = period_phrase(period);
    Notification::new(
        format!("{SUBJECT_PREFIX} Zmiany prawne {phrase}"),
        format!("Lista aktów prawnych, które weszły w życie {phrase}."),
        format!(
            "Poniżej lista aktów prawnych, które weszły w życie {phrase}{}.",
            keyword_suffix(keywords)
        ),
    )
    .with_table(render_table(acts))
}

/// Render the act table. One row per act, numbered from 1.
pub fn render_table(acts: &[ActRecord]) -> String {
    let header: String = HEADERS
        .iter()
        .map(|h| {
            format!(
                r#"<th class="text-xs" style="{HEADER_STYLE}" align="left" valign="top">{}</th>"#,
                escape_html(h)
            )
        })
        .collect();

    let rows: String = acts
        .iter()
        .enumerate()
        .map(|(i, act)| render_row(i + 1, act))
        .collect();

    format!(
        r#"<table class="table table-striped table-bordered" border="0" cellpadding="0" cellspacing="0" style="width: 100%; max-width: 100%; border: 1px solid #e2e8f0;">
<thead><tr>{header}</tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    )
}

fn render_row(ordinal: usize, act: &ActRecord) -> String {
    let cells = [
        ordinal.to_string(),
        escape_html(&act.title),
        optional(Some(&act.summary).filter(|s| !s.is_empty())),
        optional(act.promulgation.as_ref()),
        optional(act.announcement_date.as_ref()),
        optional(act.entry_into_force.as_ref()),
        optional(act.keywords.as_ref()),
        link_cell(act.document_url()),
    ];
    let cells: String = cells
        .iter()
        .map(|c| {
            format!(
                r#"<td class="text-xs" style="{CELL_STYLE}" align="left" valign="top">{c}</td>"#
            )
        })
        .collect();
    format!("<tr>{cells}</tr>\n")
}

fn optional(value: Option<&String>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| escape_html(v))
}

fn link_cell(url: Option<&str>) -> String {
    match url {
        Some(url) => format!(
            concat!(
                r#"<table class="btn btn-primary" role="presentation" border="0" cellpadding="0" cellspacing="0" style="border-radius: 6px; border-collapse: separate !important;">"#,
                r#"<tbody><tr><td style="line-height: 24px; font-size: 12px; border-radius: 6px; margin: 0;" align="center" bgcolor="{bg}">"#,
                r#"<a href="{url}" style="{style}">Pokaż</a></td></tr></tbody></table>"#,
            ),
            bg = BUTTON_BG,
            url = escape_html(url),
            style = BUTTON_STYLE,
        ),
        None => MISSING.to_string(),
    }
}
