//! Main data field (`#mmmcc:payload` lines) of a BMS file.

use std::io::Write;

use anyhow::bail;
use itertools::Itertools;

use crate::chart::{ChannelData, Section};

/// Object code written at slots holding a note.
pub const NOTE_OBJECT: &str = "AA";
/// Object code for an empty slot.
pub const EMPTY_OBJECT: &str = "00";

pub fn print_main_data_field(out: &mut impl Write, sections: &[Section]) -> anyhow::Result<()> {
    for section in sections {
        for (channel, data) in &section.channels {
            let Some(payload) = encode_payload(data)? else {
                continue;
            };
            writeln!(out, "#{}{}:{}", section.measure, channel, payload)?;
        }
    }
    Ok(())
}

/// Returns `None` if the channel places nothing in this measure.
fn encode_payload(data: &ChannelData) -> anyhow::Result<Option<String>> {
    match data {
        ChannelData::Scalar(v) => {
            if !v.is_finite() {
                bail!("Cannot write non-finite value {v}");
            }
            Ok(Some(v.to_string()))
        }
        ChannelData::Flags(flags) => {
            if !flags.contains(&true) {
                return Ok(None);
            }
            Ok(Some(
                flags
                    .iter()
                    .map(|&x| if x { NOTE_OBJECT } else { EMPTY_OBJECT })
                    .join(""),
            ))
        }
    }
}
