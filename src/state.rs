use crate::types::Daytime;

/// Every node a conversation can be in.
///
/// `CreatingReport`, `ChoosingLocation`, `UploadingSolariumCounter` and
/// `CompletingReport` are shared by both flows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConversationState {
    #[default]
    Unauthorized,
    Authorized,

    CreatingReport,
    ChoosingLocation,

    // Morning report
    EnteringMastersQuantity,
    EnteringLatecomers,
    EnteringAbsent,
    UploadingOpenCheck,

    // Evening report
    EnteringClientsLost,
    EnteringTotalClients,
    UploadingDailyExcel,
    UploadingZReport,
    EnteringSbpSum,
    EnteringDayResume,
    EnteringDisgruntledClients,
    EnteringArguesWithMasters,

    // Common states
    UploadingSolariumCounter,
    CompletingReport,
}

use ConversationState::*;

impl ConversationState {
    pub const ALL: [ConversationState; 18] = [
        Unauthorized,
        Authorized,
        CreatingReport,
        ChoosingLocation,
        EnteringMastersQuantity,
        EnteringLatecomers,
        EnteringAbsent,
        UploadingOpenCheck,
        EnteringClientsLost,
        EnteringTotalClients,
        UploadingDailyExcel,
        UploadingZReport,
        EnteringSbpSum,
        EnteringDayResume,
        EnteringDisgruntledClients,
        EnteringArguesWithMasters,
        UploadingSolariumCounter,
        CompletingReport,
    ];

    /// Forward transitions a step handler may take from this state.
    /// Self-loops are listed for the tally and album states.
    pub fn successors(self) -> &'static [ConversationState] {
        match self {
            Unauthorized => &[Authorized],
            Authorized => &[CreatingReport],
            CreatingReport => &[ChoosingLocation],
            ChoosingLocation => &[EnteringMastersQuantity, EnteringClientsLost],

            EnteringMastersQuantity => &[EnteringMastersQuantity, EnteringLatecomers],
            EnteringLatecomers => &[EnteringAbsent],
            EnteringAbsent => &[UploadingOpenCheck],
            UploadingOpenCheck => &[UploadingSolariumCounter, CompletingReport],

            EnteringClientsLost => &[EnteringClientsLost, EnteringTotalClients],
            EnteringTotalClients => &[UploadingDailyExcel],
            UploadingDailyExcel => &[
                UploadingDailyExcel,
                UploadingSolariumCounter,
                UploadingZReport,
            ],
            UploadingZReport => &[EnteringSbpSum],
            EnteringSbpSum => &[EnteringDayResume],
            EnteringDayResume => &[EnteringDisgruntledClients],
            EnteringDisgruntledClients => &[EnteringArguesWithMasters],
            EnteringArguesWithMasters => &[CompletingReport],

            UploadingSolariumCounter => &[UploadingZReport, CompletingReport],
            CompletingReport => &[Authorized],
        }
    }

    pub fn can_advance_to(self, next: ConversationState) -> bool {
        self.successors().contains(&next)
    }

    /// The flow a report state belongs to, `None` for states shared by both
    /// flows or outside of a report.
    pub fn daytime(self) -> Option<Daytime> {
        match self {
            EnteringMastersQuantity | EnteringLatecomers | EnteringAbsent | UploadingOpenCheck => {
                Some(Daytime::Morning)
            }
            EnteringClientsLost
            | EnteringTotalClients
            | UploadingDailyExcel
            | UploadingZReport
            | EnteringSbpSum
            | EnteringDayResume
            | EnteringDisgruntledClients
            | EnteringArguesWithMasters => Some(Daytime::Evening),
            _ => None,
        }
    }

    /// The first data-entry state of a flow, entered right after a location
    /// has been picked.
    pub fn first_of(daytime: Daytime) -> ConversationState {
        match daytime {
            Daytime::Morning => EnteringMastersQuantity,
            Daytime::Evening => EnteringClientsLost,
        }
    }

    /// Position of the state along its flow, used to decide which draft
    /// fields lie "after" a state when rewinding.
    pub fn order(self) -> u8 {
        match self {
            Unauthorized => 0,
            Authorized => 1,
            CreatingReport => 2,
            ChoosingLocation => 3,
            EnteringMastersQuantity | EnteringClientsLost => 4,
            EnteringLatecomers | EnteringTotalClients => 5,
            EnteringAbsent | UploadingDailyExcel => 6,
            UploadingOpenCheck => 7,
            // after the open check (morning) or the daily excel (evening)
            UploadingSolariumCounter => 8,
            UploadingZReport => 9,
            EnteringSbpSum => 10,
            EnteringDayResume => 11,
            EnteringDisgruntledClients => 12,
            EnteringArguesWithMasters => 13,
            CompletingReport => 14,
        }
    }
}
