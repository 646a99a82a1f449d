use std::collections::BTreeMap;

use chrono::NaiveDate;
use teloxide::utils::html::escape;

use crate::draft::{DraftBody, ReportDraft, Tally};
use crate::flow::location_notice;
use crate::messages::{EVENING_TITLE, MORNING_TITLE, PLACEHOLDER};
use crate::session::{AUTHOR, AUTHOR_NAME};
use crate::types::Photo;

/// A finished report: HTML text plus the photos to send with it, in album
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub album: Vec<Photo>,
}

/// Renders a report. Missing fields become a placeholder, so this never fails.
pub fn build(sticky: &BTreeMap<String, String>, draft: &ReportDraft, date: NaiveDate) -> Report {
    let title = match draft.body {
        DraftBody::Morning(_) => MORNING_TITLE,
        DraftBody::Evening(_) => EVENING_TITLE,
    };

    let mut lines = vec![
        format!("<b>{}</b>", title),
        date.format("%d.%m.%y").to_string(),
    ];
    match &draft.location {
        Some(location) => {
            lines.push(hashtag(&location.name));
            lines.push(location_notice(location));
        }
        None => lines.push(format!("#{}", PLACEHOLDER)),
    }

    let field = |key: &str| {
        sticky
            .get(key)
            .map(|v| escape(v))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    let mut sections = vec![section(
        "Администратор:",
        format!("{} ({})", field(AUTHOR_NAME), field(AUTHOR)),
    )];

    let mut album = Vec::new();
    match &draft.body {
        DraftBody::Morning(d) => {
            sections.push(section("Мастеров на смене:", tally(&d.masters_quantity)));
            sections.push(section("Опоздали:", text(&d.latecomers)));
            sections.push(section("Отсутствуют:", text(&d.absent)));

            album.extend(d.open_check.iter().cloned());
            album.extend(d.solarium_counter.iter().cloned());
        }
        DraftBody::Evening(d) => {
            sections.push(section("Упущено клиентов:", tally(&d.clients_lost)));
            sections.push(section("Всего клиентов:", text(&d.total_clients)));
            sections.push(section("Сумма СБП:", text(&d.sbp_sum)));
            sections.push(section("Как прошел день:", text(&d.day_resume)));
            sections.push(section("Недовольные клиенты:", text(&d.disgruntled_clients)));
            sections.push(section(
                "Конфликты/споры с мастерами/между мастерами:",
                text(&d.argues_with_masters),
            ));

            album.extend(d.daily_excel.iter().cloned());
            album.extend(d.solarium_counter.iter().cloned());
            album.extend(d.z_report.iter().cloned());
        }
    }

    let text = format!("{}\n\n{}", lines.join("\n"), sections.join("\n\n"));
    Report { text, album }
}

/// `Салон 1` becomes `#Салон_1`.
pub fn hashtag(name: &str) -> String {
    let tag: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("#{}", tag)
}

fn section(title: &str, body: String) -> String {
    format!("<b>{}</b>\n{}", title, body)
}

fn text(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(escape)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn tally(tally: &Tally) -> String {
    if tally.is_empty() {
        return PLACEHOLDER.to_string();
    }
    tally
        .entries()
        .iter()
        .map(|(label, value)| format!("{} {}", escape(label), escape(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportSettings;
    use crate::types::Daytime;
    use teloxide::types::MessageId;

    fn photo(id: i32) -> Photo {
        Photo {
            file_id: format!("file-{}", id),
            message_id: MessageId(id),
        }
    }

    fn identity() -> BTreeMap<String, String> {
        BTreeMap::from([
            (AUTHOR.to_string(), "@anna".to_string()),
            (AUTHOR_NAME.to_string(), "Anna <K>".to_string()),
        ])
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn evening_report_orders_the_album() {
        let settings = ReportSettings::default();
        let mut draft = ReportDraft::new(Daytime::Evening);
        draft.location = settings.location(2).cloned();
        if let DraftBody::Evening(d) = &mut draft.body {
            d.daily_excel = vec![photo(1), photo(2)];
            d.solarium_counter = vec![photo(3)];
            d.z_report = vec![photo(4)];
            d.sbp_sum = Some("1500".into());
        }

        let report = build(&identity(), &draft, date());

        let ids: Vec<i32> = report.album.iter().map(|p| p.message_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(report.text.starts_with("<b>Вечерний отчет 🌙</b>\n01.06.24\n#Салон_2"));
        assert!(report.text.contains("<b>Сумма СБП:</b>\n1500"));
        assert!(report.text.contains("Anna &lt;K&gt; (@anna)"));
    }

    #[test]
    fn missing_fields_use_the_placeholder() {
        let draft = ReportDraft::new(Daytime::Morning);

        let report = build(&BTreeMap::new(), &draft, date());

        assert!(report.text.contains("#N/A"));
        assert!(report.text.contains("<b>Мастеров на смене:</b>\nN/A"));
        assert!(report.text.contains("N/A (N/A)"));
        assert!(report.album.is_empty());
    }

    #[test]
    fn building_is_deterministic() {
        let settings = ReportSettings::default();
        let mut draft = ReportDraft::new(Daytime::Morning);
        draft.location = settings.location(1).cloned();
        if let DraftBody::Morning(d) = &mut draft.body {
            for _ in 0..4 {
                d.masters_quantity.record(&settings.masters_categories, "5");
            }
            d.latecomers = Some("none".into());
        }

        assert_eq!(build(&identity(), &draft, date()), build(&identity(), &draft, date()));
    }

    #[test]
    fn hashtag_replaces_separators() {
        assert_eq!(hashtag("Салон 1"), "#Салон_1");
        assert_eq!(hashtag(" Центр-2 "), "#Центр_2");
    }
}
