use crate::config::BrowserConfig;
use crate::domain::locator::Locator;
use crate::domain::ports::{BrowserLauncher, BrowserSession, ItemHandle};
use crate::utils::error::{HarvestError, Result};
use anyhow::anyhow;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Resolves a locator to an array of nodes under `root`.
const NODES_JS: &str = r#"
function __nodes(kind, expr, root) {
    root = root || document;
    if (kind === 'xpath') {
        const snap = document.evaluate(expr, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const out = [];
        for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
        return out;
    }
    return Array.from(root.querySelectorAll(expr));
}
"#;

/// `[kind, expression]` pair, JSON-quoted for embedding in a script.
fn js_locator(locator: &Locator) -> Result<String> {
    let (kind, expr) = match locator {
        Locator::Css(s) => ("css", s),
        Locator::XPath(s) => ("xpath", s),
    };
    Ok(format!("{}, {}", serde_json::to_string(kind)?, serde_json::to_string(expr)?))
}

/// Wraps `body` in an IIFE that has `__nodes` in scope.
fn script(body: &str) -> String {
    format!("(() => {{ {} {} }})()", NODES_JS, body)
}

/// Launches a local Chrome or Chromium through the DevTools protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self, config: &BrowserConfig) -> Result<ChromeSession> {
        let args: Vec<&OsStr> = config.extra_args.iter().map(OsStr::new).collect();

        tracing::debug!(
            headless = config.headless,
            sandbox = config.sandbox,
            "Launching Chrome {}x{}",
            config.window_width,
            config.window_height
        );

        let browser = Browser::new(LaunchOptions {
            headless: config.headless,
            sandbox: config.sandbox,
            window_size: Some((config.window_width, config.window_height)),
            path: config.chrome_path.clone(),
            args,
            idle_browser_timeout: Duration::from_secs(config.idle_timeout_secs),
            ..Default::default()
        })?;
        let tab = browser.new_tab()?;

        Ok(ChromeSession {
            browser: Some(browser),
            tab,
        })
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeSession {
    fn evaluate(&self, body: &str) -> Result<Value> {
        let result = self.tab.evaluate(&script(body), false)?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    fn evaluate_u64(&self, body: &str) -> Result<u64> {
        let value = self.evaluate(body)?;
        value
            .as_f64()
            .map(|n| n.max(0.0) as u64)
            .ok_or_else(|| anyhow!("expected a number from page script, got {}", value).into())
    }
}

impl BrowserSession for ChromeSession {
    type Item<'a> = ChromeItem<'a>;

    fn navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn click(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let element = match locator {
            Locator::Css(selector) => self
                .tab
                .wait_for_element_with_custom_timeout(selector, timeout)?,
            Locator::XPath(expression) => self
                .tab
                .wait_for_xpath_with_custom_timeout(expression, timeout)?,
        };
        element.click()?;
        Ok(())
    }

    fn exists(&self, locator: &Locator) -> Result<bool> {
        Ok(self.count(locator)? > 0)
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        let body = format!("return __nodes({}).length;", js_locator(locator)?);
        Ok(self.evaluate_u64(&body)? as usize)
    }

    fn extent(&self, container: &Locator) -> Result<u64> {
        let body = format!(
            "const el = __nodes({})[0]; return el ? el.scrollHeight : 0;",
            js_locator(container)?
        );
        self.evaluate_u64(&body)
    }

    fn expand(&self, container: &Locator) -> Result<()> {
        let body = format!(
            "const el = __nodes({})[0]; if (!el) return false; el.scrollTop = el.scrollHeight; return true;",
            js_locator(container)?
        );
        match self.evaluate(&body)? {
            Value::Bool(true) => Ok(()),
            _ => Err(anyhow!("scroll container {} disappeared", container).into()),
        }
    }

    fn click_all(&self, locator: &Locator) -> Result<usize> {
        let body = format!(
            "let n = 0; for (const el of __nodes({})) {{ try {{ el.click(); n++; }} catch (e) {{}} }} return n;",
            js_locator(locator)?
        );
        Ok(self.evaluate_u64(&body)? as usize)
    }

    fn items(&self, locator: &Locator) -> Result<Vec<ChromeItem<'_>>> {
        let total = self.count(locator)?;
        Ok((0..total)
            .map(|index| ChromeItem {
                tab: &self.tab,
                marker: locator.clone(),
                index,
            })
            .collect())
    }

    fn close(&mut self) {
        if let Err(e) = self.tab.close(true) {
            tracing::debug!("Closing tab failed: {}", e);
        }
        // dropping the Browser kills the Chrome process
        self.browser.take();
    }
}

#[derive(Debug, Deserialize)]
struct Lookup {
    found: bool,
    value: Option<String>,
}

/// The `index`th element matching `marker`, as of the `items` call.
pub struct ChromeItem<'a> {
    tab: &'a Arc<Tab>,
    marker: Locator,
    index: usize,
}

impl ChromeItem<'_> {
    /// Reads from the first descendant matching `locator`. `read` is a JS
    /// expression over `el`.
    fn lookup(&self, locator: &Locator, read: &str) -> Result<Lookup> {
        let body = format!(
            "const item = __nodes({})[{}]; \
             if (!item) return JSON.stringify({{found: false, value: null}}); \
             const el = __nodes({}, item)[0]; \
             if (!el) return JSON.stringify({{found: false, value: null}}); \
             return JSON.stringify({{found: true, value: {}}});",
            js_locator(&self.marker)?,
            self.index,
            js_locator(locator)?,
            read
        );
        let result = self.tab.evaluate(&script(&body), false)?;
        match result.value {
            Some(Value::String(raw)) => Ok(serde_json::from_str(&raw)?),
            other => Err(anyhow!("unexpected lookup result {:?}", other).into()),
        }
    }

    fn missing(locator: &Locator) -> HarvestError {
        HarvestError::FieldExtraction {
            field: locator.to_string(),
            message: "no matching element".to_string(),
        }
    }
}

impl ItemHandle for ChromeItem<'_> {
    fn text_of(&self, locator: &Locator) -> Result<String> {
        let lookup = self.lookup(locator, "el.innerText ?? el.textContent")?;
        if !lookup.found {
            return Err(Self::missing(locator));
        }
        Ok(lookup.value.unwrap_or_default())
    }

    fn attribute_of(&self, locator: &Locator, attribute: &str) -> Result<Option<String>> {
        let read = format!("el.getAttribute({})", serde_json::to_string(attribute)?);
        let lookup = self.lookup(locator, &read)?;
        if !lookup.found {
            return Err(Self::missing(locator));
        }
        Ok(lookup.value)
    }
}
