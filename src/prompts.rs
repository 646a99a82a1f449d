use crate::config::ReportSettings;
use crate::draft::DraftBody;
use crate::messages::*;
use crate::session::Session;
use crate::state::ConversationState::*;
use crate::types::Daytime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the user currently has.
    Keep,
    Remove,
    UserMenu,
    Nav,
    Excel,
    Send,
    Daytime,
    Locations(Vec<(i64, String)>),
}

impl Keyboard {
    pub fn is_inline(&self) -> bool {
        matches!(self, Keyboard::Daytime | Keyboard::Locations(_))
    }
}

/// One message the bot shows the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Prompt {
    pub fn new<T: Into<String>>(text: T, keyboard: Keyboard) -> Self {
        Prompt {
            text: text.into(),
            keyboard,
        }
    }

    /// Inline keyboards can't carry the reply keyboard, so they get a second
    /// message with Back/Cancel.
    pub fn companion(&self) -> Option<Prompt> {
        self.keyboard
            .is_inline()
            .then(|| Prompt::new(NAV_HINT, Keyboard::Nav))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callback {
    Daytime(Daytime),
    Location(i64),
}

impl Callback {
    pub fn encode(&self) -> String {
        match self {
            Callback::Daytime(daytime) => format!("daytime:{}", daytime.as_str()),
            Callback::Location(id) => format!("location:{}", id),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let (kind, value) = data.split_once(':')?;
        match kind {
            "daytime" => Daytime::parse(value).map(Callback::Daytime),
            "location" => value.parse().ok().map(Callback::Location),
            _ => None,
        }
    }
}

/// The prompt shown on entering the session's current state. Shared by the
/// forward steps and by Back, so rewinding never re-runs a step handler.
pub fn prompt_for(session: &Session, settings: &ReportSettings) -> Prompt {
    match session.state {
        Unauthorized | Authorized => Prompt::new(MENU_HINT, Keyboard::UserMenu),
        CreatingReport => Prompt::new(CHOOSE_DAYTIME, Keyboard::Daytime),
        ChoosingLocation => Prompt::new(
            CHOOSE_LOCATION,
            Keyboard::Locations(
                settings
                    .locations
                    .iter()
                    .map(|l| (l.id, format!("✂️ {}", l.name)))
                    .collect(),
            ),
        ),

        EnteringMastersQuantity => tally_prompt(session, settings, Daytime::Morning),
        EnteringLatecomers => Prompt::new(LATECOMERS, Keyboard::Nav),
        EnteringAbsent => Prompt::new(ABSENT, Keyboard::Nav),
        UploadingOpenCheck => Prompt::new(OPEN_CHECK, Keyboard::Nav),

        EnteringClientsLost => tally_prompt(session, settings, Daytime::Evening),
        EnteringTotalClients => Prompt::new(TOTAL_CLIENTS, Keyboard::Nav),
        UploadingDailyExcel => Prompt::new(DAILY_EXCEL, Keyboard::Excel),
        UploadingZReport => Prompt::new(Z_REPORT, Keyboard::Nav),
        EnteringSbpSum => Prompt::new(SBP_SUM, Keyboard::Nav),
        EnteringDayResume => Prompt::new(DAY_RESUME, Keyboard::Nav),
        EnteringDisgruntledClients => Prompt::new(DISGRUNTLED_CLIENTS, Keyboard::Nav),
        EnteringArguesWithMasters => Prompt::new(ARGUES_WITH_MASTERS, Keyboard::Nav),

        UploadingSolariumCounter => Prompt::new(UPLOAD_SOLARIUM_COUNTER, Keyboard::Nav),
        CompletingReport => Prompt::new(SEND_REPORT, Keyboard::Send),
    }
}

fn tally_prompt(session: &Session, settings: &ReportSettings, daytime: Daytime) -> Prompt {
    let labels = settings.categories(daytime);
    let tally = session.draft.as_ref().and_then(|d| match &d.body {
        DraftBody::Morning(m) => Some(&m.masters_quantity),
        DraftBody::Evening(e) => Some(&e.clients_lost),
    });
    let label = tally
        .and_then(|t| t.next_label(labels))
        .or_else(|| labels.first().map(String::as_str))
        .unwrap_or_default();

    let question = match daytime {
        Daytime::Morning => MASTERS_QUANTITY,
        Daytime::Evening => CLIENTS_LOST,
    };
    Prompt::new(format!("{}{}", question, label), Keyboard::Nav)
}
