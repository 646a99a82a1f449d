use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use teloxide::types::{ChatId, MessageId};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::draft::{DraftBody, EveningReportDraft, MorningReportDraft, ReportDraft};
use crate::state::ConversationState;

pub const AUTHOR: &str = "author";
pub const AUTHOR_NAME: &str = "author_name";

/// Per-chat conversational context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub state: ConversationState,
    /// Identity fields that survive cancel and completion.
    pub sticky: BTreeMap<String, String>,
    pub draft: Option<ReportDraft>,
    pub prev_prompt: Option<MessageId>,
    pub keyboard_prompt: Option<MessageId>,
    pub location_message: Option<MessageId>,
    /// User photos still shown in the chat while an album is collected.
    pub visible_photos: Vec<MessageId>,
}

impl Session {
    pub fn is_identified(&self) -> bool {
        self.sticky.contains_key(AUTHOR) && self.sticky.contains_key(AUTHOR_NAME)
    }

    pub fn set_identity(&mut self, author: String, author_name: String) {
        self.sticky.insert(AUTHOR.to_string(), author);
        self.sticky.insert(AUTHOR_NAME.to_string(), author_name);
    }

    /// Moves along the forward transition table.
    pub fn advance(&mut self, next: ConversationState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            bail!("No transition from {:?} to {:?}", self.state, next);
        }
        self.state = next;
        Ok(())
    }

    /// Drops the report draft and returns to the menu, keeping identity.
    pub fn reset(&mut self) {
        self.draft = None;
        self.visible_photos.clear();
        self.location_message = None;
        self.state = if self.is_identified() {
            ConversationState::Authorized
        } else {
            ConversationState::Unauthorized
        };
    }

    /// Prompt messages to delete before the next one is sent.
    pub fn take_prompts(&mut self) -> Vec<MessageId> {
        self.prev_prompt
            .take()
            .into_iter()
            .chain(self.keyboard_prompt.take())
            .collect()
    }

    pub fn morning_mut(&mut self) -> Option<&mut MorningReportDraft> {
        match self.draft.as_mut().map(|d| &mut d.body) {
            Some(DraftBody::Morning(d)) => Some(d),
            _ => None,
        }
    }

    pub fn evening_mut(&mut self) -> Option<&mut EveningReportDraft> {
        match self.draft.as_mut().map(|d| &mut d.body) {
            Some(DraftBody::Evening(d)) => Some(d),
            _ => None,
        }
    }
}

struct Slot {
    session: Arc<AsyncMutex<Session>>,
    last_used: Instant,
}

/// Process-wide session map. Each chat gets its own lock so that dispatcher
/// updates and album flushes for one chat never interleave.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ChatId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ChatId, Slot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn lock(&self, chat: ChatId) -> OwnedMutexGuard<Session> {
        let session = {
            let mut slots = self.slots();
            let slot = slots.entry(chat).or_insert_with(|| Slot {
                session: Arc::default(),
                last_used: Instant::now(),
            });
            slot.last_used = Instant::now();
            Arc::clone(&slot.session)
        };
        session.lock_owned().await
    }

    pub async fn snapshot(&self, chat: ChatId) -> Option<Session> {
        let session = {
            let slots = self.slots();
            slots.get(&chat).map(|slot| Arc::clone(&slot.session))
        }?;
        let session = session.lock().await;
        Some(session.clone())
    }

    /// Forgets chats untouched for `max_idle`. Busy sessions and sessions
    /// with a report in progress are kept. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|_, slot| {
            if slot.last_used.elapsed() < max_idle {
                return true;
            }
            match slot.session.try_lock() {
                Ok(session) => session.draft.is_some(),
                Err(_) => true,
            }
        });
        before - slots.len()
    }
}
