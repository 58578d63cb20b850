use std::io::Write;

use anyhow::Context;
use log::{debug, info};
use scraper::Html;
use url::Url;

use crate::{
    bms_writer::print_main_data_field,
    header::{build_headers, print_header_field},
    section_parser::get_sections,
    session::Driver,
};

/// Converts the chart at `url` into a BMS file written to `out`.
///
/// The driver returned by `acquire` is dropped, and thereby released, before
/// this function returns, whether the conversion succeeded or not.
pub fn run<D: Driver>(
    acquire: impl FnOnce() -> anyhow::Result<D>,
    url: &Url,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let driver = acquire().context("Failed to open a browser session")?;
    convert(&driver, url, out)
}

fn convert(driver: &impl Driver, url: &Url, out: &mut impl Write) -> anyhow::Result<()> {
    info!("Navigating to {url}");
    driver.navigate(url)?;

    let document = Html::parse_document(&driver.page_source()?);
    let headers = build_headers(driver).context("While reading chart metadata")?;
    debug!("Headers: {headers:?}");
    let sections = get_sections(&document).context("While reading chart data")?;
    info!("Found {} measures", sections.len());

    print_header_field(out, &headers)?;
    print_main_data_field(out, &sections)?;
    out.flush()?;
    Ok(())
}
