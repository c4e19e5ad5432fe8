//! External-to-internal channel map with lock-free replacement.
//!
//! The router reads the map once per message through `ArcSwap`; a
//! configuration change builds a new map and swaps it in whole, so a message
//! is never routed under a half-applied mapping.

use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const EXTERNAL_CHANNEL_COUNT: usize = 16;
pub const INTERNAL_CHANNEL_COUNT: usize = 5;

/// Internal channel ids understood by the link device.
pub const PULSE_1: u8 = 0;
pub const PULSE_2: u8 = 1;
pub const WAVE: u8 = 2;
pub const NOISE: u8 = 3;
pub const POLY: u8 = 4;

/// Why a channel voice message was not forwarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// External channel has no internal target.
    Unmapped,
    /// Target internal channel is switched off.
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    /// `targets[n]`: internal channel for external channel n (0-based).
    targets: [Option<u8>; EXTERNAL_CHANNEL_COUNT],
    enabled: [bool; INTERNAL_CHANNEL_COUNT],
}

impl Default for ChannelMap {
    /// External channels 1-5 to PULSE_1, PULSE_2, WAVE, NOISE, POLY; 6-16 disabled.
    fn default() -> Self {
        let mut targets = [None; EXTERNAL_CHANNEL_COUNT];
        for (external, target) in targets.iter_mut().take(INTERNAL_CHANNEL_COUNT).enumerate() {
            *target = Some(external as u8);
        }
        Self {
            targets,
            enabled: [true; INTERNAL_CHANNEL_COUNT],
        }
    }
}

impl ChannelMap {
    /// Nothing mapped, every internal channel enabled.
    pub fn disabled() -> Self {
        Self {
            targets: [None; EXTERNAL_CHANNEL_COUNT],
            enabled: [true; INTERNAL_CHANNEL_COUNT],
        }
    }

    /// `external`: 0-15, `internal`: 0-4.
    pub fn map(&mut self, external: u8, internal: u8) -> Result<()> {
        check_external(external)?;
        check_internal(internal)?;
        self.targets[external as usize] = Some(internal);
        Ok(())
    }

    pub fn with_mapping(mut self, external: u8, internal: u8) -> Result<Self> {
        self.map(external, internal)?;
        Ok(self)
    }

    pub fn unmap(&mut self, external: u8) -> Result<()> {
        check_external(external)?;
        self.targets[external as usize] = None;
        Ok(())
    }

    pub fn set_enabled(&mut self, internal: u8, enabled: bool) -> Result<()> {
        check_internal(internal)?;
        self.enabled[internal as usize] = enabled;
        Ok(())
    }

    #[inline]
    pub fn target(&self, external: u8) -> Option<u8> {
        self.targets.get(external as usize).copied().flatten()
    }

    #[inline]
    pub fn is_enabled(&self, internal: u8) -> bool {
        self.enabled.get(internal as usize).copied().unwrap_or(false)
    }

    /// Active internal channel for `external`, if mapped and enabled.
    #[inline]
    pub fn lookup(&self, external: u8) -> Option<u8> {
        self.resolve(external).ok()
    }

    /// Internal channel a message on `external` should be rewritten to.
    #[inline]
    pub fn resolve(&self, external: u8) -> std::result::Result<u8, DropReason> {
        let internal = self.target(external).ok_or(DropReason::Unmapped)?;
        if self.is_enabled(internal) {
            Ok(internal)
        } else {
            Err(DropReason::Disabled)
        }
    }

    /// Checks entries that may have come from deserialized configuration.
    pub fn validate(&self) -> Result<()> {
        for internal in self.targets.iter().flatten() {
            check_internal(*internal)?;
        }
        Ok(())
    }
}

fn check_external(external: u8) -> Result<()> {
    if (external as usize) < EXTERNAL_CHANNEL_COUNT {
        Ok(())
    } else {
        Err(Error::InvalidExternalChannel(external))
    }
}

fn check_internal(internal: u8) -> Result<()> {
    if (internal as usize) < INTERNAL_CHANNEL_COUNT {
        Ok(())
    } else {
        Err(Error::InvalidInternalChannel(internal))
    }
}

/// Cloneable handle for replacing the active map from any thread.
#[derive(Clone)]
pub struct ChannelMapHandle {
    current: Arc<ArcSwap<ChannelMap>>,
}

impl ChannelMapHandle {
    pub fn new(map: ChannelMap) -> Result<Self> {
        map.validate()?;
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(map)),
        })
    }

    /// Snapshot of the active map.
    pub fn load(&self) -> Arc<ChannelMap> {
        self.current.load_full()
    }

    #[inline]
    pub(crate) fn resolve(&self, external: u8) -> std::result::Result<u8, DropReason> {
        self.current.load().resolve(external)
    }

    /// Atomically replace the active map.
    pub fn store(&self, map: ChannelMap) -> Result<()> {
        map.validate()?;
        tracing::debug!("Channel map replaced: {:?}", map);
        self.current.store(Arc::new(map));
        Ok(())
    }

    /// Edit a copy of the active map and swap it in. The active map is
    /// untouched if `edit` fails.
    ///
    /// If another writer swaps the map first, `edit` is re-run on the newer
    /// map, so concurrent updates never overwrite each other.
    pub fn update<F>(&self, mut edit: F) -> Result<()>
    where
        F: FnMut(&mut ChannelMap) -> Result<()>,
    {
        let mut current = self.current.load_full();
        loop {
            let mut next = (*current).clone();
            edit(&mut next)?;
            next.validate()?;

            let previous = self.current.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                tracing::debug!("Channel map updated: {:?}", **self.current.load());
                return Ok(());
            }
            current = Arc::clone(&*previous);
        }
    }

    pub fn reset(&self) {
        self.current.store(Arc::new(ChannelMap::default()));
    }
}

impl Default for ChannelMapHandle {
    fn default() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(ChannelMap::default())),
        }
    }
}

impl std::fmt::Debug for ChannelMapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelMapHandle")
            .field("current", &**self.current.load())
            .finish()
    }
}
