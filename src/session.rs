use std::sync::Arc;

use anyhow::Context;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::{debug, info, warn};
use serde_json::Value;
use strum::{Display, EnumIter, IntoStaticStr};
use url::Url;

/// Page globals a score page defines for its chart metadata.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Query {
    Genre,
    Title,
    Artist,
    Bpm,
}
impl Query {
    /// Script expression evaluated in the page.
    pub fn expression(self) -> &'static str {
        self.into()
    }
}

pub trait Session {
    fn evaluate(&self, query: Query) -> anyhow::Result<String>;
}

/// A session that can also load pages.
///
/// Dropping a driver releases the underlying browser.
pub trait Driver: Session {
    fn navigate(&self, url: &Url) -> anyhow::Result<()>;
    fn page_source(&self) -> anyhow::Result<String>;
}

pub struct ChromeDriver {
    // Keeps the Chrome process alive; killed on drop, after the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch() -> anyhow::Result<Self> {
        info!("Launching headless Chrome");
        let browser = Browser::new(LaunchOptionsBuilder::default().headless(true).build()?)
            .context("Failed to launch browser")?;
        let tab = browser.new_tab()?;
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl Session for ChromeDriver {
    fn evaluate(&self, query: Query) -> anyhow::Result<String> {
        let object = self
            .tab
            .evaluate(query.expression(), false)
            .with_context(|| format!("While evaluating `{query}`"))?;
        let value = object
            .value
            .with_context(|| format!("`{query}` evaluated to no value"))?;
        debug!("{query} = {value}");
        Ok(stringify_value(value))
    }
}

impl Driver for ChromeDriver {
    fn navigate(&self, url: &Url) -> anyhow::Result<()> {
        self.tab
            .navigate_to(url.as_str())?
            .wait_until_navigated()
            .with_context(|| format!("Failed to load {url}"))?;
        Ok(())
    }

    fn page_source(&self) -> anyhow::Result<String> {
        self.tab.get_content()
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        info!("Closing browser");
        if let Err(e) = self.tab.close(false) {
            warn!("Failed to close tab: {e:?}");
        }
    }
}

fn stringify_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::{stringify_value, Query};

    #[test]
    fn query_expressions() {
        let expressions = Query::iter().map(Query::expression).collect::<Vec<_>>();
        assert_eq!(expressions, ["genre", "title", "artist", "bpm"]);
    }

    #[test]
    fn stringify_evaluated_values() {
        assert_eq!(stringify_value(json!("HARD TECHNO")), "HARD TECHNO");
        assert_eq!(stringify_value(json!(150)), "150");
        assert_eq!(stringify_value(json!(172.5)), "172.5");
        assert_eq!(stringify_value(json!("75-150")), "75-150");
    }
}
