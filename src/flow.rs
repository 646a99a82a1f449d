use anyhow::{Context, Result};
use teloxide::types::MessageId;

use crate::config::ReportSettings;
use crate::draft::ReportDraft;
use crate::messages::*;
use crate::prompts::{prompt_for, Callback, Keyboard, Prompt};
use crate::session::Session;
use crate::state::ConversationState::{self, *};
use crate::types::{Daytime, Location, Photo};

/// Inbound user input, already classified by the transport adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// One photo, or every photo of an album burst.
    Photos(Vec<Photo>),
    Callback(Callback),
    Next,
    Send,
    Back,
    Cancel,
    Start,
    Help,
}

impl Input {
    pub fn from_text(text: &str) -> Input {
        match text {
            BTN_NEXT => Input::Next,
            BTN_SEND => Input::Send,
            BTN_BACK => Input::Back,
            BTN_CANCEL => Input::Cancel,
            _ => Input::Text(text.to_owned()),
        }
    }
}

/// What has to happen in the chat after a step, in execution order:
/// deletions, report delivery, location notice, next prompt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Effects {
    pub delete: Vec<MessageId>,
    pub finished: Option<ReportDraft>,
    pub location_notice: Option<String>,
    pub prompt: Option<Prompt>,
}

impl Effects {
    /// Input that doesn't fit the current state: drop it and keep the prompt.
    pub fn discard(trigger: Option<MessageId>, input: &Input) -> Self {
        let mut delete: Vec<MessageId> = trigger.into_iter().collect();
        if let Input::Photos(photos) = input {
            delete.extend(photos.iter().map(|p| p.message_id));
        }
        Effects {
            delete,
            ..Effects::default()
        }
    }
}

/// Trigger message plus the previous prompt, deleted before the next prompt.
pub fn hygiene(session: &mut Session, trigger: Option<MessageId>) -> Vec<MessageId> {
    trigger.into_iter().chain(session.take_prompts()).collect()
}

/// Runs the step handler of the session's current state.
///
/// The session is mutated in place; callers work on a copy and only keep it
/// once every effect went through.
pub fn step(
    session: &mut Session,
    input: Input,
    trigger: Option<MessageId>,
    settings: &ReportSettings,
) -> Result<Effects> {
    let state = session.state;

    match (state, input) {
        (Authorized, Input::Text(text)) if text == BTN_SEND_REPORT => {
            session.draft = None;
            advance(session, CreatingReport, trigger, settings)
        }

        (CreatingReport, Input::Callback(Callback::Daytime(daytime))) => {
            session.draft = Some(ReportDraft::new(daytime));
            advance(session, ChoosingLocation, trigger, settings)
        }

        (ChoosingLocation, Input::Callback(Callback::Location(id))) => {
            let Some(location) = settings.location(id) else {
                log::warn!("Location {} is not configured", id);
                let mut prompt = prompt_for(session, settings);
                prompt.text = format!("{}\n{}", LOCATION_NOT_FOUND, prompt.text);
                return Ok(Effects {
                    delete: hygiene(session, trigger),
                    prompt: Some(prompt),
                    ..Effects::default()
                });
            };
            let draft = session.draft.as_mut().context("Location chosen without a report")?;
            draft.location = Some(location.clone());
            let first = ConversationState::first_of(draft.daytime());

            let mut effects = advance(session, first, trigger, settings)?;
            effects.location_notice = Some(location_notice(location));
            Ok(effects)
        }

        (EnteringMastersQuantity | EnteringClientsLost, Input::Text(value))
            if !value.trim().is_empty() =>
        {
            let daytime = state.daytime().context("Tally state outside of a flow")?;
            let labels = settings.categories(daytime);
            let tally = match daytime {
                Daytime::Morning => session.morning_mut().map(|d| &mut d.masters_quantity),
                Daytime::Evening => session.evening_mut().map(|d| &mut d.clients_lost),
            }
            .context("Tally entered without a matching report")?;

            let next = match tally.record(labels, value.trim()) {
                Some(_) => state,
                None if daytime == Daytime::Morning => EnteringLatecomers,
                None => EnteringTotalClients,
            };
            advance(session, next, trigger, settings)
        }

        (
            EnteringLatecomers
            | EnteringAbsent
            | EnteringTotalClients
            | EnteringSbpSum
            | EnteringDayResume
            | EnteringDisgruntledClients
            | EnteringArguesWithMasters,
            Input::Text(value),
        ) if !value.trim().is_empty() => {
            let next = store_text(session, value.trim().to_owned())?;
            advance(session, next, trigger, settings)
        }

        (UploadingDailyExcel, Input::Photos(photos)) => {
            let draft = session
                .evening_mut()
                .context("Daily excel outside of an evening report")?;
            draft.daily_excel.extend(photos.iter().cloned());
            let collected = draft.daily_excel.len();
            session
                .visible_photos
                .extend(photos.iter().map(|p| p.message_id));
            log::debug!("Daily excel photos collected: {}", collected);
            Ok(Effects::default())
        }

        (UploadingDailyExcel, Input::Next) => {
            let collected = session.evening_mut().map_or(0, |d| d.daily_excel.len());
            if collected < settings.daily_excel_min_photos {
                log::debug!(
                    "Next with {} of {} daily excel photos, staying",
                    collected,
                    settings.daily_excel_min_photos
                );
                return Ok(Effects::discard(trigger, &Input::Next));
            }

            let next = if has_solarium_step(session, settings) {
                UploadingSolariumCounter
            } else {
                UploadingZReport
            };
            let visible: Vec<MessageId> = session.visible_photos.drain(..).collect();
            let mut effects = advance(session, next, trigger, settings)?;
            effects.delete.extend(visible);
            Ok(effects)
        }

        (UploadingOpenCheck | UploadingSolariumCounter | UploadingZReport, Input::Photos(photos))
            if !photos.is_empty() =>
        {
            let mut uploaded: Vec<MessageId> = photos.iter().map(|p| p.message_id).collect();
            let next = store_photos(session, photos, settings)?;
            let mut effects = advance(session, next, trigger, settings)?;
            uploaded.append(&mut effects.delete);
            effects.delete = uploaded;
            Ok(effects)
        }

        (CompletingReport, Input::Send) => {
            let finished = session.draft.take().context("Nothing to send")?;
            session.advance(Authorized)?;
            let mut delete = hygiene(session, trigger);
            delete.extend(session.location_message.take());
            delete.extend(session.visible_photos.drain(..));
            session.reset();
            Ok(Effects {
                delete,
                finished: Some(finished),
                location_notice: None,
                prompt: Some(Prompt::new(REPORT_COMPLETED, Keyboard::UserMenu)),
            })
        }

        (Authorized, input) => {
            log::debug!("Unexpected input in the menu: {:?}", input);
            let mut effects = Effects::discard(trigger, &input);
            effects.delete.extend(session.take_prompts());
            effects.prompt = Some(prompt_for(session, settings));
            Ok(effects)
        }

        (_, input) => {
            log::debug!("Ignoring {:?} in {:?}", input, state);
            Ok(Effects::discard(trigger, &input))
        }
    }
}

fn advance(
    session: &mut Session,
    next: ConversationState,
    trigger: Option<MessageId>,
    settings: &ReportSettings,
) -> Result<Effects> {
    session.advance(next)?;
    Ok(Effects {
        delete: hygiene(session, trigger),
        prompt: Some(prompt_for(session, settings)),
        ..Effects::default()
    })
}

fn has_solarium_step(session: &Session, settings: &ReportSettings) -> bool {
    session
        .draft
        .as_ref()
        .is_some_and(|d| settings.has_solarium_step(d))
}

/// Writes a free-text answer and returns the state that follows it.
fn store_text(session: &mut Session, value: String) -> Result<ConversationState> {
    let state = session.state;
    if state.daytime() == Some(Daytime::Morning) {
        let draft = session.morning_mut().context("Morning step without a morning report")?;
        return Ok(match state {
            EnteringLatecomers => {
                draft.latecomers = Some(value);
                EnteringAbsent
            }
            _ => {
                draft.absent = Some(value);
                UploadingOpenCheck
            }
        });
    }

    let draft = session.evening_mut().context("Evening step without an evening report")?;
    Ok(match state {
        EnteringTotalClients => {
            draft.total_clients = Some(value);
            UploadingDailyExcel
        }
        EnteringSbpSum => {
            draft.sbp_sum = Some(value);
            EnteringDayResume
        }
        EnteringDayResume => {
            draft.day_resume = Some(value);
            EnteringDisgruntledClients
        }
        EnteringDisgruntledClients => {
            draft.disgruntled_clients = Some(value);
            EnteringArguesWithMasters
        }
        _ => {
            draft.argues_with_masters = Some(value);
            CompletingReport
        }
    })
}

/// Stores a single-shot photo burst and returns the state that follows it.
fn store_photos(
    session: &mut Session,
    photos: Vec<Photo>,
    settings: &ReportSettings,
) -> Result<ConversationState> {
    let solarium = has_solarium_step(session, settings);
    let daytime = session
        .draft
        .as_ref()
        .map(|d| d.daytime())
        .context("Photo step without a report")?;

    Ok(match (session.state, daytime) {
        (UploadingOpenCheck, _) => {
            let draft = session.morning_mut().context("Open check outside of a morning report")?;
            draft.open_check = photos;
            if solarium {
                UploadingSolariumCounter
            } else {
                CompletingReport
            }
        }
        (UploadingSolariumCounter, Daytime::Morning) => {
            if let Some(draft) = session.morning_mut() {
                draft.solarium_counter = photos;
            }
            CompletingReport
        }
        (UploadingSolariumCounter, Daytime::Evening) => {
            if let Some(draft) = session.evening_mut() {
                draft.solarium_counter = photos;
            }
            UploadingZReport
        }
        _ => {
            let draft = session.evening_mut().context("Z-report outside of an evening report")?;
            draft.z_report = photos;
            EnteringSbpSum
        }
    })
}

pub fn location_notice(location: &Location) -> String {
    format!(
        "• <b>Филиал:</b> {}\n• <b>Адрес:</b> {}",
        teloxide::utils::html::escape(&location.name),
        teloxide::utils::html::escape(&location.address)
    )
}
