//! Bridge configuration.

use crate::{Error, Result};
use midiboy_io::{ChannelMap, LinkConfig, DEFAULT_RING_CAPACITY};
use serde::{Deserialize, Serialize};

const MAX_RING_CAPACITY: usize = 1 << 16;

/// Everything a host can persist about a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Serial receive ring size in bytes. Power of two.
    pub ring_capacity: usize,
    pub link: LinkConfig,
    pub channel_map: ChannelMap,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            link: LinkConfig::default(),
            channel_map: ChannelMap::default(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ring_capacity < 2
            || self.ring_capacity > MAX_RING_CAPACITY
            || !self.ring_capacity.is_power_of_two()
        {
            return Err(Error::InvalidConfig(format!(
                "ring_capacity {} must be a power of two in 2-{}",
                self.ring_capacity, MAX_RING_CAPACITY
            )));
        }
        self.link.validate()?;
        self.channel_map.validate()?;
        Ok(())
    }
}
