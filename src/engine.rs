use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use teloxide::types::{ChatId, MessageId};

use crate::album::AlbumCollector;
use crate::collaborators::{Delivery, Directory, Messenger};
use crate::config::ReportSettings;
use crate::draft::ReportDraft;
use crate::flow::{self, hygiene, Effects, Input};
use crate::messages::{GREETINGS, HELP, SOMETHING_WRONG};
use crate::navigation;
use crate::prompts::{prompt_for, Keyboard, Prompt};
use crate::report;
use crate::session::{Session, SessionStore};
use crate::state::ConversationState;
use crate::types::{Photo, Sender};

/// Drives conversations: looks up the chat's session, runs the step or
/// navigation logic on a copy of it and commits the copy once every
/// collaborator call went through.
pub struct Engine {
    messenger: Arc<dyn Messenger>,
    directory: Arc<dyn Directory>,
    delivery: Arc<dyn Delivery>,
    settings: Arc<ReportSettings>,
    admin_ids: Vec<ChatId>,
    sessions: SessionStore,
    albums: Arc<AlbumCollector>,
}

impl Engine {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        directory: Arc<dyn Directory>,
        delivery: Arc<dyn Delivery>,
        settings: Arc<ReportSettings>,
        admin_ids: Vec<ChatId>,
    ) -> Arc<Self> {
        let albums = AlbumCollector::new(settings.album_window());
        Arc::new(Engine {
            messenger,
            directory,
            delivery,
            settings,
            admin_ids,
            sessions: SessionStore::new(),
            albums,
        })
    }

    pub async fn session(&self, chat: ChatId) -> Option<Session> {
        self.sessions.snapshot(chat).await
    }

    /// Handles one inbound update.
    pub async fn process(
        &self,
        chat: ChatId,
        sender: &Sender,
        input: Input,
        trigger: Option<MessageId>,
    ) {
        let mut session = self.sessions.lock(chat).await;
        self.run(chat, &mut session, sender, input, trigger).await;
    }

    /// Photos of a media group are buffered and processed as one input.
    pub fn receive_photo(
        self: &Arc<Self>,
        chat: ChatId,
        sender: Sender,
        photo: Photo,
        media_group: Option<String>,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let engine = Arc::clone(self);
        async move {
            match media_group {
                None => {
                    engine
                        .process(chat, &sender, Input::Photos(vec![photo]), None)
                        .await
                }
                Some(group) => {
                    let ready_engine = Arc::clone(&engine);
                    let ready_group = group.clone();
                    engine.albums.push(chat, group, photo, move || async move {
                        ready_engine.process_album(chat, &sender, &ready_group).await
                    });
                }
            }
        }
    }

    /// Drops sessions that sat idle for `max_idle` without a report in progress.
    pub fn sweep_sessions(&self, max_idle: Duration) -> usize {
        let evicted = self.sessions.evict_idle(max_idle);
        if evicted > 0 {
            log::info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Claims a finished album under the chat's lock. Anything that got the
    /// lock first (Next, Back, Cancel) has already taken or dropped it.
    async fn process_album(&self, chat: ChatId, sender: &Sender, group: &str) {
        let mut session = self.sessions.lock(chat).await;
        let Some(photos) = self.albums.take(chat, group) else {
            log::debug!("Album {} in chat {} was already handled", group, chat);
            return;
        };
        self.run(chat, &mut session, sender, Input::Photos(photos), None)
            .await;
    }

    /// Errors end here: they are logged and the user gets a generic notice,
    /// the session stays as it was.
    async fn run(
        &self,
        chat: ChatId,
        session: &mut Session,
        sender: &Sender,
        input: Input,
        trigger: Option<MessageId>,
    ) {
        if let Err(e) = self.handle(chat, session, sender, input, trigger).await {
            log::error!("Failed to handle update in chat {}: {:?}", chat, e);
            let notice = Prompt::new(SOMETHING_WRONG, Keyboard::Keep);
            if let Err(e) = self.messenger.send(chat, &notice).await {
                log::error!("Failed to send error notice to chat {}: {:?}", chat, e);
            }
        }
    }

    async fn handle(
        &self,
        chat: ChatId,
        session: &mut Session,
        sender: &Sender,
        input: Input,
        trigger: Option<MessageId>,
    ) -> Result<()> {
        let mut next = session.clone();

        // Albums still waiting for their window belong before this input.
        let albums = self.albums.take_chat(chat);
        let resets = matches!(input, Input::Start | Input::Cancel)
            || next.state == ConversationState::Unauthorized;
        let dropped: Vec<MessageId> = if resets {
            albums.iter().flatten().map(|p| p.message_id).collect()
        } else {
            for photos in albums {
                let effects = flow::step(&mut next, Input::Photos(photos), None, &self.settings)?;
                self.apply(chat, &mut next, effects).await?;
            }
            Vec::new()
        };

        let mut effects = match input {
            Input::Start => self.authorize(&mut next, sender, trigger).await?,
            _ if next.state == ConversationState::Unauthorized => {
                self.authorize(&mut next, sender, trigger).await?
            }
            Input::Help => {
                let current = prompt_for(&next, &self.settings);
                Effects {
                    delete: hygiene(&mut next, trigger),
                    prompt: Some(Prompt::new(
                        format!("{}\n\n{}", HELP, current.text),
                        current.keyboard,
                    )),
                    ..Effects::default()
                }
            }
            Input::Cancel => navigation::cancel(&mut next, trigger),
            Input::Back => navigation::back(&mut next, trigger, &self.settings),
            input => flow::step(&mut next, input, trigger, &self.settings)?,
        };
        effects.delete.extend(dropped);

        self.apply(chat, &mut next, effects).await?;

        log::debug!("{:?}, {:?}", next.state, next.draft);
        *session = next;
        Ok(())
    }

    async fn authorize(
        &self,
        session: &mut Session,
        sender: &Sender,
        trigger: Option<MessageId>,
    ) -> Result<Effects> {
        let user = self.directory.upsert_user(sender).await?;
        log::info!("User from DB: {:?}", user);

        session.set_identity(user.author(), user.display_name());

        let mut delete = hygiene(session, trigger);
        delete.extend(session.location_message.take());
        delete.extend(session.visible_photos.drain(..));
        session.reset();

        Ok(Effects {
            delete,
            prompt: Some(Prompt::new(GREETINGS, Keyboard::UserMenu)),
            ..Effects::default()
        })
    }

    /// Runs the effects in order: deletions, report delivery, location
    /// notice, prompt.
    async fn apply(&self, chat: ChatId, session: &mut Session, effects: Effects) -> Result<()> {
        for message in effects.delete {
            if let Err(e) = self.messenger.delete(chat, message).await {
                log::debug!("Could not delete message {} in chat {}: {:?}", message, chat, e);
            }
        }

        let Some(draft) = effects.finished else {
            return self
                .show(chat, session, effects.location_notice, effects.prompt)
                .await;
        };

        self.deliver(session, &draft).await?;

        // Delivery is the commit point. Later send failures are only logged.
        if let Err(e) = self
            .show(chat, session, effects.location_notice, effects.prompt)
            .await
        {
            log::error!("Report delivered but chat {} missed the reply: {:?}", chat, e);
        }
        Ok(())
    }

    async fn show(
        &self,
        chat: ChatId,
        session: &mut Session,
        location_notice: Option<String>,
        prompt: Option<Prompt>,
    ) -> Result<()> {
        if let Some(text) = location_notice {
            let notice = Prompt::new(text, Keyboard::Keep);
            session.location_message = Some(self.messenger.send(chat, &notice).await?);
        }

        if let Some(prompt) = prompt {
            session.prev_prompt = Some(self.messenger.send(chat, &prompt).await?);
            if let Some(companion) = prompt.companion() {
                session.keyboard_prompt = Some(self.messenger.send(chat, &companion).await?);
            }
        }

        Ok(())
    }

    async fn deliver(&self, session: &Session, draft: &ReportDraft) -> Result<()> {
        let today = chrono::Local::now().date_naive();
        let report = report::build(&session.sticky, draft, today);

        let mut recipients = self.admin_ids.clone();
        if let Some(location) = &draft.location {
            for chat in self.directory.recipients_for_location(location.id).await? {
                if !recipients.contains(&chat) {
                    recipients.push(chat);
                }
            }
        }

        if recipients.is_empty() {
            bail!("Nobody to deliver the report to");
        }

        let sent = self.delivery.broadcast(&recipients, &report).await?;
        if sent == 0 {
            bail!("Report reached none of {} recipients", recipients.len());
        }
        log::info!(
            "Report delivered to {} of {} recipients",
            sent,
            recipients.len()
        );
        Ok(())
    }
}
