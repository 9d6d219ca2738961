//! Ordering guard for backend hydration.
//!
//! Each fetch takes a ticket from a per-collection counter before the
//! request goes out. When the response lands, it is applied only if its
//! ticket is newer than the last one applied for that collection, so a slow
//! response can never overwrite the result of a later request.

/// Collection a fetch hydrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Doctors,
    Patients,
    Appointments,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctors => "doctors",
            Self::Patients => "patients",
            Self::Appointments => "appointments",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Doctors => 0,
            Self::Patients => 1,
            Self::Appointments => 2,
        }
    }
}

/// Issued by [`DomainCache::begin_fetch`](super::DomainCache::begin_fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    kind: EntityKind,
    seq: u64,
}

impl FetchTicket {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub(crate) struct FetchSequences {
    issued: [u64; 3],
    applied: [u64; 3],
}

impl FetchSequences {
    pub(crate) fn issue(&mut self, kind: EntityKind) -> FetchTicket {
        let slot = &mut self.issued[kind.index()];
        *slot += 1;
        FetchTicket { kind, seq: *slot }
    }

    /// Record `ticket` as applied if nothing newer has been.
    pub(crate) fn accept(&mut self, ticket: FetchTicket) -> bool {
        let applied = &mut self.applied[ticket.kind.index()];
        if ticket.seq <= *applied {
            return false;
        }
        *applied = ticket.seq;
        true
    }

    pub(crate) fn last_applied(&self, kind: EntityKind) -> u64 {
        self.applied[kind.index()]
    }
}
