use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use derive_more::{Display, Into};
use indexmap::IndexMap;

/// BMS measure number, printed as the three-digit part of `#mmmcc`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, Into)]
#[display("{_0:03}")]
pub struct Measure(u16);
impl TryFrom<u32> for Measure {
    type Error = anyhow::Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            0..=999 => Ok(Self(v as u16)),
            _ => bail!("Measure number out of range: {v}"),
        }
    }
}
impl Measure {
    pub fn get(self) -> u16 {
        self.0
    }
}

/// Two-character channel identifier, the `cc` part of `#mmmcc`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChannelId([u8; 2]);
impl ChannelId {
    pub const MEASURE_LENGTH: Self = Self(*b"02");
    pub const KEY1: Self = Self(*b"11");
    pub const KEY2: Self = Self(*b"12");
    pub const KEY3: Self = Self(*b"13");
    pub const KEY4: Self = Self(*b"14");
    pub const KEY5: Self = Self(*b"15");
    pub const SCRATCH: Self = Self(*b"16");
    pub const KEY6: Self = Self(*b"18");
    pub const KEY7: Self = Self(*b"19");

    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics ever get in.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}
impl FromStr for ChannelId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            &[a, b] if a.is_ascii_alphanumeric() && b.is_ascii_alphanumeric() => Ok(Self([a, b])),
            _ => bail!("Invalid channel id: {s:?}"),
        }
    }
}
impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ChannelData {
    /// One entry per equally spaced slot of the measure; `true` places a note.
    Flags(Vec<bool>),
    /// Measure-level control value, such as the length multiplier on `02`.
    Scalar(f64),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Section {
    pub measure: Measure,
    pub channels: IndexMap<ChannelId, ChannelData>,
}
