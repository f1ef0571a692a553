use crate::{RunOutput, errors::RunFailure, model::ProviderId};

/// What a `RunStream` yields, in order: one `Started`, any number of
/// `Fragment`s, then exactly one of `Finished` or `Failed`.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Started {
        run_id: uuid::Uuid,
        provider: ProviderId,
        model: String,
    },
    /// Next piece of generated text. `seq` counts fragments from 0 and never
    /// skips; empty provider deltas are not forwarded.
    Fragment {
        run_id: uuid::Uuid,
        seq: u64,
        text: String,
    },
    Finished {
        run_id: uuid::Uuid,
        output: RunOutput,
    },
    Failed {
        run_id: uuid::Uuid,
        error: RunFailure,
    },
}

impl StreamEvent {
    pub fn run_id(&self) -> uuid::Uuid {
        match self {
            Self::Started { run_id, .. }
            | Self::Fragment { run_id, .. }
            | Self::Finished { run_id, .. }
            | Self::Failed { run_id, .. } => *run_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Failed { .. })
    }
}
