//! Extracts per-measure note data from a rendered score page.
//!
//! Every measure is drawn as its own `table`: the first `th` carries the
//! measure number, the `height` attribute the drawn height, and each note is
//! an absolutely positioned `img` (`style="top:..px;left:..px"`).  Tables
//! without a numeric `th` are page layout and are skipped.

use std::ops::Range;

use anyhow::{bail, Context};
use indexmap::IndexMap;
use itertools::Itertools;
use scraper::{ElementRef, Html};

use crate::chart::{ChannelData, ChannelId, Measure, Section};

/// Drawn height of a 4/4 measure.
pub const FULL_MEASURE_HEIGHT: u32 = 128;
/// Tallest measure accepted; 64 times a 4/4 measure.
pub const MAX_MEASURE_HEIGHT: u32 = FULL_MEASURE_HEIGHT * 64;
const DEFAULT_NOTE_HEIGHT: u32 = 4;

/// Horizontal extent of each 1P lane, in output order.
const LANES: [(Range<u32>, ChannelId); 8] = [
    (0..36, ChannelId::SCRATCH),
    (36..50, ChannelId::KEY1),
    (50..62, ChannelId::KEY2),
    (62..76, ChannelId::KEY3),
    (76..88, ChannelId::KEY4),
    (88..102, ChannelId::KEY5),
    (102..114, ChannelId::KEY6),
    (114..128, ChannelId::KEY7),
];

pub fn get_sections(html: &Html) -> anyhow::Result<Vec<Section>> {
    let mut sections = vec![];
    for table in html.select(selector!("table")) {
        let Some(measure) = parse_measure_number(table)? else {
            continue;
        };
        let section = parse_measure(table, measure)
            .with_context(|| format!("While parsing measure {measure}"))?;
        sections.push(section);
    }
    if sections.is_empty() {
        bail!("No measures found");
    }
    Ok(sections)
}

fn parse_measure_number(table: ElementRef) -> anyhow::Result<Option<Measure>> {
    let Some(th) = table
        .select(selector!("th"))
        .find(|th| owning_table(*th) == Some(table))
    else {
        return Ok(None);
    };
    let text = th.text().collect::<String>();
    let text = text.trim();
    if !regex!(r"^[0-9]+$").is_match(text) {
        return Ok(None);
    }
    Ok(Some(text.parse::<u32>()?.try_into()?))
}

fn parse_measure(table: ElementRef, measure: Measure) -> anyhow::Result<Section> {
    let height = table
        .attr("height")
        .context("Measure table has no `height` attribute")?
        .trim()
        .parse::<u32>()?;
    if !(1..=MAX_MEASURE_HEIGHT).contains(&height) {
        bail!("Measure height {height}px is out of range");
    }

    let notes = table
        .select(selector!("img"))
        .filter(|img| owning_table(*img) == Some(table))
        .filter_map(|img| parse_note(img, height).transpose())
        .try_collect::<_, Vec<_>, _>()?;

    let unit = notes
        .iter()
        .fold(height, |unit, &(_, offset)| gcd(unit, offset));
    let slots = (height / unit) as usize;

    let mut channels = IndexMap::new();
    if height != FULL_MEASURE_HEIGHT {
        channels.insert(
            ChannelId::MEASURE_LENGTH,
            ChannelData::Scalar(height as f64 / FULL_MEASURE_HEIGHT as f64),
        );
    }
    for (_, lane) in &LANES {
        let mut flags = vec![false; slots];
        for &(_, offset) in notes.iter().filter(|(channel, _)| channel == lane) {
            flags[(offset / unit) as usize] = true;
        }
        channels.insert(*lane, ChannelData::Flags(flags));
    }
    Ok(Section { measure, channels })
}

/// Lane and offset from the bottom of the measure, or `None` for decorations.
fn parse_note(img: ElementRef, measure_height: u32) -> anyhow::Result<Option<(ChannelId, u32)>> {
    let Some(style) = img.attr("style") else {
        return Ok(None);
    };
    let Some(top) = regex!(r"(?:^|;)\s*top\s*:\s*([0-9]+)px").captures(style) else {
        return Ok(None);
    };
    let top = top[1].parse::<u32>()?;
    let left = regex!(r"(?:^|;)\s*left\s*:\s*([0-9]+)px")
        .captures(style)
        .with_context(|| format!("Note has no horizontal position: {}", img.html()))?[1]
        .parse::<u32>()?;
    let note_height = match img.attr("height") {
        Some(h) => h.trim().parse::<u32>()?,
        None => DEFAULT_NOTE_HEIGHT,
    };

    let Some(bottom) = top
        .checked_add(note_height)
        .filter(|&bottom| bottom != 0 && bottom <= measure_height)
    else {
        bail!("Note at top:{top}px lies outside a {measure_height}px measure");
    };
    let (_, lane) = LANES
        .iter()
        .find(|(range, _)| range.contains(&left))
        .with_context(|| format!("No lane at left:{left}px"))?;
    Ok(Some((*lane, measure_height - bottom)))
}

fn owning_table(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
