use teloxide::types::MessageId;

use crate::config::ReportSettings;
use crate::flow::{hygiene, Effects};
use crate::messages::REPORT_CANCELED;
use crate::prompts::{prompt_for, Keyboard, Prompt};
use crate::session::Session;
use crate::state::ConversationState::{self, *};
use crate::types::Daytime;

/// Where Back leads from the session's current state, `None` when Back
/// means nothing there.
pub fn back_target(session: &Session, settings: &ReportSettings) -> Option<ConversationState> {
    let draft = session.draft.as_ref();
    let daytime = draft.map(|d| d.daytime());
    let solarium = draft.is_some_and(|d| settings.has_solarium_step(d));

    let target = match session.state {
        Unauthorized | Authorized => return None,

        CreatingReport => Authorized,
        ChoosingLocation => CreatingReport,
        EnteringMastersQuantity | EnteringClientsLost => ChoosingLocation,

        EnteringLatecomers => EnteringMastersQuantity,
        EnteringAbsent => EnteringLatecomers,
        UploadingOpenCheck => EnteringAbsent,

        EnteringTotalClients => EnteringClientsLost,
        UploadingDailyExcel => EnteringTotalClients,
        UploadingZReport if solarium => UploadingSolariumCounter,
        UploadingZReport => UploadingDailyExcel,
        EnteringSbpSum => UploadingZReport,
        EnteringDayResume => EnteringSbpSum,
        EnteringDisgruntledClients => EnteringDayResume,
        EnteringArguesWithMasters => EnteringDisgruntledClients,

        UploadingSolariumCounter => match daytime? {
            Daytime::Morning => UploadingOpenCheck,
            Daytime::Evening => UploadingDailyExcel,
        },
        CompletingReport => match daytime? {
            Daytime::Evening => EnteringArguesWithMasters,
            Daytime::Morning if solarium => UploadingSolariumCounter,
            Daytime::Morning => UploadingOpenCheck,
        },
    };
    Some(target)
}

/// Rewinds one step, discarding the data of the step being re-entered and
/// of everything after it.
pub fn back(
    session: &mut Session,
    trigger: Option<MessageId>,
    settings: &ReportSettings,
) -> Effects {
    let Some(target) = back_target(session, settings) else {
        log::debug!("Back has no meaning in {:?}", session.state);
        return Effects::discard(trigger, &crate::flow::Input::Back);
    };

    let mut delete = hygiene(session, trigger);
    delete.extend(session.visible_photos.drain(..));

    if target.order() <= ChoosingLocation.order() {
        delete.extend(session.location_message.take());
    }

    match target {
        Authorized => session.reset(),
        CreatingReport => session.draft = None,
        _ => {
            if let Some(draft) = session.draft.as_mut() {
                draft.discard_from(target);
            }
        }
    }
    session.state = target;

    log::debug!("Back to {:?}", target);

    Effects {
        delete,
        prompt: Some(prompt_for(session, settings)),
        ..Effects::default()
    }
}

/// Drops the report in progress. Identity fields stay so the user is not
/// asked to authorize again.
pub fn cancel(session: &mut Session, trigger: Option<MessageId>) -> Effects {
    let mut delete = hygiene(session, trigger);
    delete.extend(session.location_message.take());
    delete.extend(session.visible_photos.drain(..));

    session.reset();

    Effects {
        delete,
        prompt: Some(Prompt::new(REPORT_CANCELED, Keyboard::UserMenu)),
        ..Effects::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DraftBody, ReportDraft};
    use crate::flow::{step, Input};
    use crate::types::Photo;
    use crate::session::{AUTHOR, AUTHOR_NAME};

    fn filled_morning(filled: usize) -> Session {
        let settings = ReportSettings::default();
        let mut draft = ReportDraft::new(Daytime::Morning);
        draft.location = settings.location(1).cloned();
        let mut session = Session {
            state: EnteringMastersQuantity,
            draft: Some(draft),
            location_message: Some(MessageId(3)),
            prev_prompt: Some(MessageId(4)),
            ..Session::default()
        };
        session.set_identity("@anna".into(), "Anna".into());
        for _ in 0..filled {
            step(&mut session, Input::Text("2".into()), None, &settings).unwrap();
        }
        session
    }

    fn photos(first: i32) -> Vec<Photo> {
        (first..first + 2)
            .map(|id| Photo {
                file_id: format!("file-{}", id),
                message_id: MessageId(id),
            })
            .collect()
    }

    fn full_draft(daytime: Daytime, location_id: i64, settings: &ReportSettings) -> ReportDraft {
        let mut draft = ReportDraft::new(daytime);
        let location = settings.location(location_id).cloned().unwrap();
        let solarium = location.has_solarium;
        draft.location = Some(location);

        let labels = settings.categories(daytime);
        match &mut draft.body {
            DraftBody::Morning(d) => {
                for _ in labels {
                    d.masters_quantity.record(labels, "2");
                }
                d.latecomers = Some("нет".into());
                d.absent = Some("нет".into());
                d.open_check = photos(10);
                if solarium {
                    d.solarium_counter = photos(20);
                }
            }
            DraftBody::Evening(d) => {
                for _ in labels {
                    d.clients_lost.record(labels, "1");
                }
                d.total_clients = Some("30".into());
                d.daily_excel = photos(10);
                if solarium {
                    d.solarium_counter = photos(20);
                }
                d.z_report = photos(30);
                d.sbp_sum = Some("1500".into());
                d.day_resume = Some("хорошо".into());
                d.disgruntled_clients = Some("нет".into());
                d.argues_with_masters = Some("нет".into());
            }
        }
        draft
    }

    /// Steps whose data is present in the draft, in flow order.
    fn filled_steps(draft: &ReportDraft) -> Vec<ConversationState> {
        let mut filled = vec![(ChoosingLocation, draft.location.is_some())];
        match &draft.body {
            DraftBody::Morning(d) => filled.extend([
                (EnteringMastersQuantity, !d.masters_quantity.is_empty()),
                (EnteringLatecomers, d.latecomers.is_some()),
                (EnteringAbsent, d.absent.is_some()),
                (UploadingOpenCheck, !d.open_check.is_empty()),
                (UploadingSolariumCounter, !d.solarium_counter.is_empty()),
            ]),
            DraftBody::Evening(d) => filled.extend([
                (EnteringClientsLost, !d.clients_lost.is_empty()),
                (EnteringTotalClients, d.total_clients.is_some()),
                (UploadingDailyExcel, !d.daily_excel.is_empty()),
                (UploadingSolariumCounter, !d.solarium_counter.is_empty()),
                (UploadingZReport, !d.z_report.is_empty()),
                (EnteringSbpSum, d.sbp_sum.is_some()),
                (EnteringDayResume, d.day_resume.is_some()),
                (EnteringDisgruntledClients, d.disgruntled_clients.is_some()),
                (EnteringArguesWithMasters, d.argues_with_masters.is_some()),
            ]),
        }
        filled
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(state, _)| state)
            .collect()
    }

    #[test]
    fn back_follows_the_table_and_discards_from_the_target() {
        use Daytime::{Evening, Morning};

        let settings = ReportSettings::default();
        // (from, flow, location, to); location 2 has a solarium, 1 does not.
        let rows = [
            (CreatingReport, Morning, 1, Authorized),
            (ChoosingLocation, Morning, 1, CreatingReport),
            (EnteringMastersQuantity, Morning, 1, ChoosingLocation),
            (EnteringLatecomers, Morning, 1, EnteringMastersQuantity),
            (EnteringAbsent, Morning, 1, EnteringLatecomers),
            (UploadingOpenCheck, Morning, 1, EnteringAbsent),
            (UploadingSolariumCounter, Morning, 2, UploadingOpenCheck),
            (CompletingReport, Morning, 2, UploadingSolariumCounter),
            (CompletingReport, Morning, 1, UploadingOpenCheck),
            (EnteringClientsLost, Evening, 1, ChoosingLocation),
            (EnteringTotalClients, Evening, 1, EnteringClientsLost),
            (UploadingDailyExcel, Evening, 1, EnteringTotalClients),
            (UploadingSolariumCounter, Evening, 2, UploadingDailyExcel),
            (UploadingZReport, Evening, 2, UploadingSolariumCounter),
            (UploadingZReport, Evening, 1, UploadingDailyExcel),
            (EnteringSbpSum, Evening, 1, UploadingZReport),
            (EnteringDayResume, Evening, 1, EnteringSbpSum),
            (EnteringDisgruntledClients, Evening, 1, EnteringDayResume),
            (EnteringArguesWithMasters, Evening, 1, EnteringDisgruntledClients),
            (CompletingReport, Evening, 2, EnteringArguesWithMasters),
            (CompletingReport, Evening, 1, EnteringArguesWithMasters),
        ];

        for (from, daytime, location, to) in rows {
            let full = full_draft(daytime, location, &settings);
            let mut session = Session {
                state: from,
                draft: Some(full.clone()),
                location_message: Some(MessageId(3)),
                prev_prompt: Some(MessageId(4)),
                ..Session::default()
            };
            session.set_identity("@anna".into(), "Anna".into());

            let effects = back(&mut session, Some(MessageId(50)), &settings);

            assert_eq!(session.state, to, "back from {:?} at location {}", from, location);
            assert!(effects.delete.contains(&MessageId(50)));
            assert!(effects.delete.contains(&MessageId(4)));
            assert_eq!(
                effects.delete.contains(&MessageId(3)),
                to.order() <= ChoosingLocation.order()
            );
            assert_eq!(effects.prompt, Some(prompt_for(&session, &settings)));

            match to {
                Authorized | CreatingReport => assert!(session.draft.is_none()),
                _ => {
                    let kept: Vec<ConversationState> = filled_steps(&full)
                        .into_iter()
                        .filter(|step| step.order() < to.order())
                        .collect();
                    assert_eq!(
                        filled_steps(session.draft.as_ref().unwrap()),
                        kept,
                        "data left after back from {:?} to {:?}",
                        from,
                        to
                    );
                }
            }
        }
    }

    #[test]
    fn back_into_the_solarium_keeps_the_open_check() {
        let settings = ReportSettings::default();
        let mut session = Session {
            state: CompletingReport,
            draft: Some(full_draft(Daytime::Morning, 2, &settings)),
            ..Session::default()
        };

        back(&mut session, None, &settings);
        assert_eq!(session.state, UploadingSolariumCounter);
        let draft = session.morning_mut().unwrap();
        assert_eq!(draft.open_check.len(), 2);
        assert!(draft.solarium_counter.is_empty());

        back(&mut session, None, &settings);
        assert_eq!(session.state, UploadingOpenCheck);
        let draft = session.morning_mut().unwrap();
        assert!(draft.open_check.is_empty());
        assert_eq!(draft.absent.as_deref(), Some("нет"));
    }

    #[test]
    fn back_from_tally_returns_to_location_choice() {
        let settings = ReportSettings::default();
        for filled in 0..settings.masters_categories.len() {
            let mut session = filled_morning(filled);
            assert_eq!(session.state, EnteringMastersQuantity);

            let effects = back(&mut session, Some(MessageId(50)), &settings);

            assert_eq!(session.state, ChoosingLocation);
            let draft = session.draft.as_ref().unwrap();
            assert!(draft.location.is_none());
            assert!(session.morning_mut().unwrap().masters_quantity.is_empty());
            assert!(effects.delete.contains(&MessageId(3)));
            assert!(effects.delete.contains(&MessageId(50)));
            assert!(matches!(
                effects.prompt.unwrap().keyboard,
                Keyboard::Locations(_)
            ));
        }
    }

    #[test]
    fn back_into_the_tally_restarts_the_loop() {
        let settings = ReportSettings::default();
        let mut session = filled_morning(settings.masters_categories.len());
        assert_eq!(session.state, EnteringLatecomers);

        let effects = back(&mut session, None, &settings);

        assert_eq!(session.state, EnteringMastersQuantity);
        assert!(session.morning_mut().unwrap().masters_quantity.is_empty());
        assert!(effects
            .prompt
            .unwrap()
            .text
            .ends_with(&settings.masters_categories[0]));
    }

    #[test]
    fn back_out_of_the_album_deletes_collected_photos() {
        let settings = ReportSettings::default();
        let mut draft = ReportDraft::new(Daytime::Evening);
        draft.location = settings.location(1).cloned();
        let mut session = Session {
            state: UploadingDailyExcel,
            draft: Some(draft),
            ..Session::default()
        };
        let photo = |id| crate::types::Photo {
            file_id: "f".into(),
            message_id: MessageId(id),
        };
        step(&mut session, Input::Photos(vec![photo(7), photo(8)]), None, &settings).unwrap();

        let effects = back(&mut session, None, &settings);

        assert_eq!(session.state, EnteringTotalClients);
        assert!(session.evening_mut().unwrap().daily_excel.is_empty());
        assert!(session.visible_photos.is_empty());
        assert!(effects.delete.contains(&MessageId(7)));
        assert!(effects.delete.contains(&MessageId(8)));
    }

    #[test]
    fn back_is_a_noop_in_the_menu() {
        let settings = ReportSettings::default();
        let mut session = Session {
            state: Authorized,
            prev_prompt: Some(MessageId(4)),
            ..Session::default()
        };

        let effects = back(&mut session, Some(MessageId(5)), &settings);

        assert_eq!(session.state, Authorized);
        assert_eq!(session.prev_prompt, Some(MessageId(4)));
        assert!(effects.prompt.is_none());
    }

    #[test]
    fn z_report_goes_back_through_the_solarium_when_present() {
        let settings = ReportSettings::default();
        let mut draft = ReportDraft::new(Daytime::Evening);
        draft.location = settings.location(2).cloned();
        let session = Session {
            state: UploadingZReport,
            draft: Some(draft.clone()),
            ..Session::default()
        };
        assert_eq!(back_target(&session, &settings), Some(UploadingSolariumCounter));

        draft.location = settings.location(1).cloned();
        let session = Session {
            state: UploadingZReport,
            draft: Some(draft),
            ..Session::default()
        };
        assert_eq!(back_target(&session, &settings), Some(UploadingDailyExcel));
    }

    #[test]
    fn cancel_keeps_only_identity() {
        for state in ConversationState::ALL {
            let mut session = filled_morning(2);
            session.state = state;

            let effects = cancel(&mut session, Some(MessageId(60)));

            assert_eq!(session.state, Authorized);
            assert!(session.draft.is_none());
            assert!(session.location_message.is_none());
            assert_eq!(session.sticky.len(), 2);
            assert!(session.sticky.contains_key(AUTHOR));
            assert!(session.sticky.contains_key(AUTHOR_NAME));
            assert_eq!(effects.prompt.unwrap().text, REPORT_CANCELED);
        }
    }

    #[test]
    fn cancel_without_identity_is_unauthorized() {
        let mut session = Session {
            state: CreatingReport,
            ..Session::default()
        };
        cancel(&mut session, None);
        assert_eq!(session.state, Unauthorized);
    }
}
