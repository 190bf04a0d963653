//! One team's editable, persisted roster

use std::sync::Arc;

use thiserror::Error;
use winrate_protocol::{Stat, Type};

use crate::lookup::{LookupTicket, LookupTracker};
use crate::persist::{PersistError, PersistedState};
use crate::roster::{Roster, RosterError, SlotId};
use crate::set::{PokemonPatch, PokemonSet};
use crate::stats::{StatError, propose_ev, propose_iv};
use crate::storage::Storage;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Stat(#[from] StatError),

    /// The edit was applied in memory but could not be written
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What happened to a species lookup answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer lookup was issued for the slot, or the slot was removed
    Superseded,
}

/// A roster mirrored to storage, with stat edits gated by the EV/IV rules
/// and species edits sequenced through a [`LookupTracker`].
#[derive(Debug)]
pub struct TeamEditor {
    state: PersistedState<Roster>,
    lookups: LookupTracker,
}

impl TeamEditor {
    /// Open the roster stored under `key`, falling back to `default`
    pub fn open(key: impl Into<String>, default: Roster, storage: Arc<dyn Storage>) -> Self {
        Self {
            state: PersistedState::open(key, default, storage),
            lookups: LookupTracker::new(),
        }
    }

    pub fn from_state(state: PersistedState<Roster>) -> Self {
        Self {
            state,
            lookups: LookupTracker::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        self.state.get()
    }

    pub fn state(&self) -> &PersistedState<Roster> {
        &self.state
    }

    pub fn add(&mut self, set: PokemonSet) -> Result<SlotId, EditError> {
        self.state
            .try_modify(|roster| Ok::<_, EditError>(roster.add(set)?))
    }

    pub fn update(&mut self, index: usize, patch: PokemonPatch) -> Result<(), EditError> {
        self.state
            .try_modify(|roster| Ok::<_, EditError>(roster.update(index, patch)?))
    }

    pub fn remove(&mut self, index: usize) -> Result<PokemonSet, EditError> {
        let slot = self.slot_at(index)?;
        let result = self
            .state
            .try_modify(|roster| Ok::<_, EditError>(roster.remove(index)?));

        // A failed write still leaves the slot removed in memory
        if self.roster().position(slot).is_none() {
            self.lookups.forget(slot);
        }
        result
    }

    /// Set one stat's EVs, refusing values that break the EV budget
    pub fn set_ev(&mut self, index: usize, stat: Stat, value: u16) -> Result<(), EditError> {
        let current = self.set_at(index)?.evs;
        let evs = propose_ev(&current, stat, value)?;
        self.update(index, PokemonPatch::new().evs(evs))
    }

    pub fn set_iv(&mut self, index: usize, stat: Stat, value: u8) -> Result<(), EditError> {
        let current = self.set_at(index)?.effective_ivs();
        let ivs = propose_iv(&current, stat, value)?;
        self.update(index, PokemonPatch::new().ivs(ivs))
    }

    /// Change the species at `index` and issue a lookup ticket for it.
    ///
    /// Type tags for the old species are cleared right away; the caller
    /// resolves `ticket.species` and hands the answer to
    /// [`apply_species_types`](Self::apply_species_types).
    pub fn begin_species_edit(
        &mut self,
        index: usize,
        species: impl Into<String>,
    ) -> Result<LookupTicket, EditError> {
        let species = species.into();
        let slot = self.slot_at(index)?;

        // Any answer for the previous species is stale from here on, even if
        // the write below fails after the species was replaced in memory
        self.lookups.forget(slot);
        self.update(
            index,
            PokemonPatch::new().species(species.clone()).clear_types(),
        )?;

        let ticket = self.lookups.issue(slot, species);
        tracing::debug!(slot = %ticket.slot, seq = ticket.seq, species = %ticket.species, "Issued species lookup");
        Ok(ticket)
    }

    /// Apply resolved type tags if `ticket` is still the latest lookup for
    /// its slot. At most two tags are kept.
    pub fn apply_species_types(
        &mut self,
        ticket: &LookupTicket,
        mut types: Vec<Type>,
    ) -> Result<Resolution, EditError> {
        if !self.lookups.settle(ticket) {
            tracing::debug!(slot = %ticket.slot, seq = ticket.seq, "Discarding superseded species lookup");
            return Ok(Resolution::Superseded);
        }

        types.truncate(2);
        self.state.try_modify(|roster| {
            Ok::<_, EditError>(roster.update_by_id(ticket.slot, PokemonPatch::new().types(types))?)
        })?;
        Ok(Resolution::Applied)
    }

    /// Give up on a lookup that failed, leaving the species untyped
    pub fn discard_species_edit(&mut self, ticket: &LookupTicket) {
        self.lookups.settle(ticket);
    }

    fn set_at(&self, index: usize) -> Result<&PokemonSet, RosterError> {
        self.roster()
            .get(index)
            .ok_or(RosterError::IndexOutOfRange {
                index,
                len: self.roster().len(),
            })
    }

    fn slot_at(&self, index: usize) -> Result<SlotId, RosterError> {
        self.roster()
            .id_at(index)
            .ok_or(RosterError::IndexOutOfRange {
                index,
                len: self.roster().len(),
            })
    }
}
