// Write interception: spotting a streamed file in host directory writes and
// forwarding its data blocks to the bound handler.
//
// The host never announces "open" or "close". A file being copied shows up as
// a new root-directory entry (with its final size) written back by the host
// driver; the data clusters that follow are attributed to that entry until
// its declared size has been forwarded.

use log::{debug, info, trace, warn};
use vfat_core::{VfatError, BLOCK_SIZE};

use crate::families::fat::common::{FatDirEntry, DIR_ENTRY_SIZE};

use super::registry::{WriteExtensionRegistry, MAX_FILE_SLOTS};

/// The file currently being streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSession {
    binding: usize,
    slot: usize,
    declared_size: u32,
    remaining: i64,
}

impl WriteSession {
    pub fn binding(&self) -> usize {
        self.binding
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }
}

/// Snapshot of the active session for callers outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub extension: String,
    pub slot: usize,
    pub declared_size: u32,
    pub remaining: u32,
}

/// Outcome of scanning one root-directory sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Bound { slot: usize, declared_size: u32 },
    /// A session is still pending; the sector was not scanned.
    Deferred,
    NoMatch,
}

/// Owns the single active session and the last bound directory slot.
#[derive(Debug, Default)]
pub struct SessionTracker {
    active: Option<WriteSession>,
    last_bound: Option<usize>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&WriteSession> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn last_bound(&self) -> Option<usize> {
        self.last_bound
    }

    /// Drop the active session. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(session) => {
                warn!(
                    "Cancelled write session on slot {} with {} of {} bytes outstanding",
                    session.slot, session.remaining, session.declared_size
                );
                true
            }
            None => false,
        }
    }

    /// Scan the first root-directory sector written by the host.
    ///
    /// Slots `first_slot..15` are examined (slot `j` lives at byte
    /// `(j + 1) * 32`, after the volume label). The first entry whose
    /// extension has a binding binds a new session, unless it sits in the
    /// slot bound last time, which the host rewrites unchanged on every
    /// directory flush.
    pub fn scan(
        &mut self,
        sector: &[u8],
        first_slot: usize,
        bindings: &WriteExtensionRegistry,
    ) -> ScanOutcome {
        if let Some(session) = &self.active {
            debug!(
                "Directory write while slot {} still has {} bytes pending, scan deferred",
                session.slot, session.remaining
            );
            return ScanOutcome::Deferred;
        }

        let mut last_bound_present = false;
        let mut outcome = ScanOutcome::NoMatch;

        for slot in first_slot..MAX_FILE_SLOTS {
            let offset = (slot + 1) * DIR_ENTRY_SIZE;
            let entry = FatDirEntry::from_bytes(&sector[offset..offset + DIR_ENTRY_SIZE]);
            let size = entry.file_size;

            if size == 0 && entry.is_end() {
                break;
            }
            let attrs = entry.attributes();
            if size == 0 || entry.is_deleted() || attrs.is_volume_id() || attrs.is_system() {
                continue;
            }

            let Some(binding) = bindings.find(&entry.ext) else {
                continue;
            };

            if self.last_bound == Some(slot) {
                last_bound_present = true;
                continue;
            }

            if outcome == ScanOutcome::NoMatch {
                info!(
                    "Found write file {} in slot {}, {} bytes",
                    String::from_utf8_lossy(&entry.name).trim_end(),
                    slot,
                    size
                );
                self.active = Some(WriteSession {
                    binding,
                    slot,
                    declared_size: size,
                    remaining: size as i64,
                });
                outcome = ScanOutcome::Bound {
                    slot,
                    declared_size: size,
                };
            }
        }

        match outcome {
            ScanOutcome::Bound { slot, .. } => self.last_bound = Some(slot),
            _ if !last_bound_present => {
                if let Some(slot) = self.last_bound.take() {
                    debug!("Slot {} no longer holds a write file, forgetting it", slot);
                }
            }
            _ => {}
        }

        outcome
    }

    /// Forward one data block to the active session's handler.
    ///
    /// On handler failure the session stays active so the caller can decide
    /// whether to cancel it.
    pub fn forward(
        &mut self,
        data: &[u8],
        block_offset: u32,
        bindings: &mut WriteExtensionRegistry,
    ) -> Result<(), VfatError> {
        let Some(session) = self.active.as_mut() else {
            return Ok(());
        };

        let remaining = session.remaining as u32;
        let binding = bindings
            .get_mut(session.binding)
            .ok_or_else(|| VfatError::Configuration(format!(
                "write binding {} disappeared",
                session.binding
            )))?;

        trace!("Forwarding block {} ({} bytes remaining)", block_offset, remaining);
        if let Err(e) = binding.handler_mut().accept(data, block_offset, remaining) {
            warn!("Write handler rejected block {}: {:#}", block_offset, e);
            return Err(VfatError::HandlerRejected {
                offset: block_offset,
                reason: format!("{:#}", e),
            });
        }

        session.remaining -= BLOCK_SIZE as i64;
        if session.remaining <= 0 {
            info!(
                "Write session on slot {} complete ({} bytes)",
                session.slot, session.declared_size
            );
            self.active = None;
        }
        Ok(())
    }
}
