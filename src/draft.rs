use crate::state::ConversationState::{self, *};
use crate::types::{Daytime, Location, Photo};

/// Ordered sub-category counts, filled one input at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, String)>,
}

impl Tally {
    /// Assigns `value` to the first label without an entry and returns the
    /// label that still needs one afterwards, if any.
    pub fn record<'a>(&mut self, labels: &'a [String], value: &str) -> Option<&'a str> {
        if let Some(label) = self.next_label(labels) {
            self.entries.push((label.to_owned(), value.to_owned()));
        }
        self.next_label(labels)
    }

    pub fn next_label<'a>(&self, labels: &'a [String]) -> Option<&'a str> {
        labels
            .iter()
            .find(|label| !self.entries.iter().any(|(filled, _)| filled == *label))
            .map(String::as_str)
    }

    pub fn is_complete(&self, labels: &[String]) -> bool {
        self.next_label(labels).is_none()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MorningReportDraft {
    pub masters_quantity: Tally,
    pub latecomers: Option<String>,
    pub absent: Option<String>,
    pub open_check: Vec<Photo>,
    pub solarium_counter: Vec<Photo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EveningReportDraft {
    pub clients_lost: Tally,
    pub total_clients: Option<String>,
    pub daily_excel: Vec<Photo>,
    pub solarium_counter: Vec<Photo>,
    pub z_report: Vec<Photo>,
    pub sbp_sum: Option<String>,
    pub day_resume: Option<String>,
    pub disgruntled_clients: Option<String>,
    pub argues_with_masters: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftBody {
    Morning(MorningReportDraft),
    Evening(EveningReportDraft),
}

/// Everything collected for the report currently being filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDraft {
    pub location: Option<Location>,
    pub body: DraftBody,
}

impl ReportDraft {
    pub fn new(daytime: Daytime) -> Self {
        let body = match daytime {
            Daytime::Morning => DraftBody::Morning(MorningReportDraft::default()),
            Daytime::Evening => DraftBody::Evening(EveningReportDraft::default()),
        };
        ReportDraft {
            location: None,
            body,
        }
    }

    pub fn daytime(&self) -> Daytime {
        match self.body {
            DraftBody::Morning(_) => Daytime::Morning,
            DraftBody::Evening(_) => Daytime::Evening,
        }
    }

    pub fn has_solarium(&self) -> bool {
        self.location.as_ref().is_some_and(|l| l.has_solarium)
    }

    /// Drops every field written by `state` or by a state after it, so the
    /// flow can be re-entered at `state` with clean data.
    pub fn discard_from(&mut self, state: ConversationState) {
        let from = state.order();
        let cleared = |writer: ConversationState| writer.order() >= from;

        if cleared(ChoosingLocation) {
            self.location = None;
        }

        match &mut self.body {
            DraftBody::Morning(d) => {
                if cleared(EnteringMastersQuantity) {
                    d.masters_quantity.clear();
                }
                if cleared(EnteringLatecomers) {
                    d.latecomers = None;
                }
                if cleared(EnteringAbsent) {
                    d.absent = None;
                }
                if cleared(UploadingOpenCheck) {
                    d.open_check.clear();
                }
                if cleared(UploadingSolariumCounter) {
                    d.solarium_counter.clear();
                }
            }
            DraftBody::Evening(d) => {
                if cleared(EnteringClientsLost) {
                    d.clients_lost.clear();
                }
                if cleared(EnteringTotalClients) {
                    d.total_clients = None;
                }
                if cleared(UploadingDailyExcel) {
                    d.daily_excel.clear();
                }
                if cleared(UploadingSolariumCounter) {
                    d.solarium_counter.clear();
                }
                if cleared(UploadingZReport) {
                    d.z_report.clear();
                }
                if cleared(EnteringSbpSum) {
                    d.sbp_sum = None;
                }
                if cleared(EnteringDayResume) {
                    d.day_resume = None;
                }
                if cleared(EnteringDisgruntledClients) {
                    d.disgruntled_clients = None;
                }
                if cleared(EnteringArguesWithMasters) {
                    d.argues_with_masters = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::MessageId;

    fn labels() -> Vec<String> {
        ["a", "b", "c"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tally_fills_labels_in_order() {
        let labels = labels();
        let mut tally = Tally::default();

        assert_eq!(tally.record(&labels, "1"), Some("b"));
        assert_eq!(tally.record(&labels, "2"), Some("c"));
        assert!(!tally.is_complete(&labels));
        assert_eq!(tally.record(&labels, "3"), None);
        assert!(tally.is_complete(&labels));
        assert_eq!(
            tally.entries(),
            &[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn full_tally_ignores_extra_values() {
        let labels = labels();
        let mut tally = Tally::default();
        for value in ["1", "2", "3", "4"] {
            tally.record(&labels, value);
        }
        assert_eq!(tally.len(), 3);
    }

    #[test]
    fn discard_keeps_fields_before_the_target() {
        let photo = Photo {
            file_id: "f".into(),
            message_id: MessageId(7),
        };
        let mut draft = ReportDraft::new(Daytime::Evening);
        if let DraftBody::Evening(d) = &mut draft.body {
            d.clients_lost.record(&labels(), "1");
            d.total_clients = Some("12".into());
            d.daily_excel = vec![photo.clone(), photo.clone()];
            d.z_report = vec![photo];
            d.sbp_sum = Some("300".into());
        }

        draft.discard_from(UploadingDailyExcel);

        let DraftBody::Evening(d) = &draft.body else {
            panic!("evening draft expected");
        };
        assert_eq!(d.clients_lost.len(), 1);
        assert_eq!(d.total_clients.as_deref(), Some("12"));
        assert!(d.daily_excel.is_empty());
        assert!(d.z_report.is_empty());
        assert!(d.sbp_sum.is_none());
    }
}
