use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::article::Field;

/// Which draft verb currently holds a field busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftAction {
    Regenerating,
    Accepting,
    Rejecting,
}

/// Coarse per-verb busy flags, derived from the per-field states.
/// One banner row per verb class is all the original surface renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionFlags {
    pub regenerating: bool,
    pub accepting: bool,
    pub rejecting: bool,
}

/// Ticket for one issued generation call. A result may only be committed
/// while its ticket is still the field's newest.
#[derive(Debug, Clone, Copy)]
pub struct GenerationTicket {
    pub field: Field,
    token: u64,
}

/// Bookkeeping for pending suggestion proposals.
///
/// Tracks which fields have an outstanding user-visible proposal, which
/// fields are mid-verb, and a per-field token that invalidates generation
/// results arriving after the field's proposal state has moved on.
///
/// Per field the lifecycle is: no proposal, then proposed once a
/// generation result commits, then back to no proposal on accept or
/// reject. A second generation for an already-proposed field replaces the
/// draft in place; the proposal list never holds duplicates.
#[derive(Debug, Default)]
pub struct ProposalLedger {
    proposals: IndexSet<Field>,
    busy: IndexMap<Field, DraftAction>,
    tokens: HashMap<Field, u64>,
}

impl ProposalLedger {
    pub fn new() -> Self {
        ProposalLedger::default()
    }

    /// Fields with an outstanding proposal, oldest first
    pub fn proposals(&self) -> &IndexSet<Field> {
        &self.proposals
    }

    pub fn has_proposal(&self, field: Field) -> bool {
        self.proposals.contains(&field)
    }

    /// Start a verb on a field: marks it busy and advances its token so
    /// any result still in flight from an earlier call goes stale.
    pub fn begin(&mut self, field: Field, action: DraftAction) -> GenerationTicket {
        let token = self.tokens.entry(field).or_insert(0);
        *token += 1;
        self.busy.insert(field, action);
        GenerationTicket {
            field,
            token: *token,
        }
    }

    /// Clear the busy marker for a field once its verb returns
    pub fn finish(&mut self, field: Field) {
        self.busy.shift_remove(&field);
    }

    /// Whether the ticket is still the newest issued for its field
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.tokens.get(&ticket.field) == Some(&ticket.token)
    }

    /// Record a proposal for the ticket's field, unless the ticket has
    /// gone stale. Returns whether the proposal was recorded.
    pub fn propose(&mut self, ticket: GenerationTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.proposals.insert(ticket.field);
        true
    }

    /// Settle a field's proposal (accept or reject path). Returns whether
    /// a proposal existed. Safe to call on a field without one.
    pub fn resolve(&mut self, field: Field) -> bool {
        self.proposals.shift_remove(&field)
    }

    /// The verb currently holding a field busy, if any
    pub fn busy(&self, field: Field) -> Option<DraftAction> {
        self.busy.get(&field).copied()
    }

    /// Derive the coarse per-verb flags
    pub fn flags(&self) -> ActionFlags {
        let mut flags = ActionFlags::default();
        for action in self.busy.values() {
            match action {
                DraftAction::Regenerating => flags.regenerating = true,
                DraftAction::Accepting => flags.accepting = true,
                DraftAction::Rejecting => flags.rejecting = true,
            }
        }
        flags
    }
}
