//! Framework code templates
//!
//! One template per `(TestKind, Framework)` pair. Templates use `{field}`
//! placeholders; unknown placeholders (and code braces) are left untouched.
//! Framework-specific fragments (element lookups, optional assertions,
//! navigation steps) are rendered here so synthesis never handles raw syntax.

use crate::element::{Element, ElementKind, Locator};
use crate::framework::Framework;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CSS matched by a validation/error indicator after an empty submit
pub const ERROR_INDICATOR: &str = r#".error, .invalid-feedback, [aria-invalid="true"], :invalid"#;

/// CSS matched by a success indicator after a form submission
pub const SUCCESS_INDICATOR: &str = r#".success, .alert-success, [role="status"]"#;

/// Conventional credentials used for form and workflow specifications
pub const TEST_EMAIL: &str = "test@example.com";
/// Conventional password used for form and workflow specifications
pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Kind of generated test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Button click interaction
    Click,
    /// Input fill and verify
    Fill,
    /// Input submitted empty, validation indicator expected
    FillEmpty,
    /// Link navigation
    Navigate,
    /// Form submission
    Submit,
    /// Login → redirect → navigation → content workflow
    Workflow,
}

impl TestKind {
    /// Get all test kinds
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Click,
            Self::Fill,
            Self::FillEmpty,
            Self::Navigate,
            Self::Submit,
            Self::Workflow,
        ]
    }

    /// Tag used in generated IDs
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Fill => "fill",
            Self::FillEmpty => "fill-empty",
            Self::Navigate => "navigate",
            Self::Submit => "submit",
            Self::Workflow => "workflow",
        }
    }

    /// Element kind the test targets; `None` for the composite workflow
    #[must_use]
    pub const fn element_kind(&self) -> Option<ElementKind> {
        match self {
            Self::Click => Some(ElementKind::Button),
            Self::Fill | Self::FillEmpty => Some(ElementKind::Input),
            Self::Navigate => Some(ElementKind::Link),
            Self::Submit => Some(ElementKind::Form),
            Self::Workflow => None,
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

const PLAYWRIGHT_CLICK: &str = r"import { test, expect } from '@playwright/test';

test('{title}', async ({ page }) => {
  await page.goto('{base_url}');
  const target = {target};
{checks}  await target.click();
});
";

const PLAYWRIGHT_FILL: &str = r"import { test, expect } from '@playwright/test';

test('{title}', async ({ page }) => {
  await page.goto('{base_url}');
  const field = {target};
  await field.fill('{fill_value}');
{checks}});
";

const PLAYWRIGHT_FILL_EMPTY: &str = r"import { test, expect } from '@playwright/test';

test('{title}', async ({ page }) => {
  await page.goto('{base_url}');
  const field = {target};
  await field.fill('');
  await field.press('Enter');
  await expect(page.locator('{error_indicator}').first()).toBeVisible();
});
";

const PLAYWRIGHT_NAVIGATE: &str = r"import { test, expect } from '@playwright/test';

test('{title}', async ({ page }) => {
  await page.goto('{base_url}');
  await {target}.click();
  await expect(page).toHaveURL('{href}');
});
";

const PLAYWRIGHT_SUBMIT: &str = r"import { test, expect } from '@playwright/test';

test('{title}', async ({ page }) => {
  await page.goto('{base_url}');
  await {email_field}.fill('{email}');
  await {password_field}.fill('{password}');
  await {submit_button}.click();
  await expect(page.locator('{success_indicator}').first()).toBeVisible();
});
";

const PLAYWRIGHT_WORKFLOW: &str = r"import { test, expect } from '@playwright/test';

test.describe('{title}', () => {
  test('login, redirect, navigate and verify content', async ({ page }) => {
    await page.goto('{base_url}');
    await {email_field}.fill('{email}');
    await {password_field}.fill('{password}');
    await {submit_button}.click();
    await expect(page).not.toHaveURL('{base_url}');
{nav_step}    await expect(page.locator('body')).not.toBeEmpty();
  });
});
";

const SELENIUM_CLICK: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        target = {target}
{checks}        target.click()
    finally:
        driver.quit()
";

const SELENIUM_FILL: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        field = {target}
        field.clear()
        field.send_keys('{fill_value}')
{checks}    finally:
        driver.quit()
";

const SELENIUM_FILL_EMPTY: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.common.keys import Keys


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        field = {target}
        field.clear()
        field.send_keys(Keys.ENTER)
        errors = driver.find_elements(By.CSS_SELECTOR, '{error_indicator}')
        assert errors, 'expected a validation error indicator'
    finally:
        driver.quit()
";

const SELENIUM_NAVIGATE: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        {target}.click()
        assert driver.current_url == '{href}'
    finally:
        driver.quit()
";

const SELENIUM_SUBMIT: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        {email_field}.send_keys('{email}')
        {password_field}.send_keys('{password}')
        {submit_button}.click()
        indicators = driver.find_elements(By.CSS_SELECTOR, '{success_indicator}')
        assert indicators, 'expected a success indicator'
    finally:
        driver.quit()
";

const SELENIUM_WORKFLOW: &str = r"from selenium import webdriver
from selenium.webdriver.common.by import By


def test_{fn_name}():
    # {summary}
    driver = webdriver.Chrome()
    try:
        driver.get('{base_url}')
        {email_field}.send_keys('{email}')
        {password_field}.send_keys('{password}')
        {submit_button}.click()
        assert driver.current_url != '{base_url}'
{nav_step}        assert driver.find_element(By.TAG_NAME, 'body').text.strip()
    finally:
        driver.quit()
";

const CYPRESS_CLICK: &str = r"describe('{title}', () => {
  it('clicks the element', () => {
    cy.visit('{base_url}');
{checks}    {target}.click();
  });
});
";

const CYPRESS_FILL: &str = r"describe('{title}', () => {
  it('fills the field', () => {
    cy.visit('{base_url}');
    {target}.clear().type('{fill_value}');
{checks}  });
});
";

const CYPRESS_FILL_EMPTY: &str = r"describe('{title}', () => {
  it('shows a validation error when submitted empty', () => {
    cy.visit('{base_url}');
    {target}.clear().type('{enter}');
    cy.get('{error_indicator}').should('exist');
  });
});
";

const CYPRESS_NAVIGATE: &str = r"describe('{title}', () => {
  it('navigates to the link target', () => {
    cy.visit('{base_url}');
    {target}.click();
    cy.url().should('eq', '{href}');
  });
});
";

const CYPRESS_SUBMIT: &str = r"describe('{title}', () => {
  it('submits the form', () => {
    cy.visit('{base_url}');
    {email_field}.type('{email}');
    {password_field}.type('{password}');
    {submit_button}.click();
    cy.get('{success_indicator}').should('be.visible');
  });
});
";

const CYPRESS_WORKFLOW: &str = r"describe('{title}', () => {
  it('login, redirect, navigate and verify content', () => {
    cy.visit('{base_url}');
    {email_field}.type('{email}');
    {password_field}.type('{password}');
    {submit_button}.click();
    cy.url().should('not.eq', '{base_url}');
{nav_step}    cy.get('body').should('not.be.empty');
  });
});
";

/// Template text for a test kind and framework
#[must_use]
pub const fn template(kind: TestKind, framework: Framework) -> &'static str {
    match (kind, framework) {
        (TestKind::Click, Framework::Playwright) => PLAYWRIGHT_CLICK,
        (TestKind::Fill, Framework::Playwright) => PLAYWRIGHT_FILL,
        (TestKind::FillEmpty, Framework::Playwright) => PLAYWRIGHT_FILL_EMPTY,
        (TestKind::Navigate, Framework::Playwright) => PLAYWRIGHT_NAVIGATE,
        (TestKind::Submit, Framework::Playwright) => PLAYWRIGHT_SUBMIT,
        (TestKind::Workflow, Framework::Playwright) => PLAYWRIGHT_WORKFLOW,
        (TestKind::Click, Framework::Selenium) => SELENIUM_CLICK,
        (TestKind::Fill, Framework::Selenium) => SELENIUM_FILL,
        (TestKind::FillEmpty, Framework::Selenium) => SELENIUM_FILL_EMPTY,
        (TestKind::Navigate, Framework::Selenium) => SELENIUM_NAVIGATE,
        (TestKind::Submit, Framework::Selenium) => SELENIUM_SUBMIT,
        (TestKind::Workflow, Framework::Selenium) => SELENIUM_WORKFLOW,
        (TestKind::Click, Framework::Cypress) => CYPRESS_CLICK,
        (TestKind::Fill, Framework::Cypress) => CYPRESS_FILL,
        (TestKind::FillEmpty, Framework::Cypress) => CYPRESS_FILL_EMPTY,
        (TestKind::Navigate, Framework::Cypress) => CYPRESS_NAVIGATE,
        (TestKind::Submit, Framework::Cypress) => CYPRESS_SUBMIT,
        (TestKind::Workflow, Framework::Cypress) => CYPRESS_WORKFLOW,
    }
}

/// Substitute `{field}` placeholders in one left-to-right scan
///
/// Unknown placeholders are left as-is; substituted values are never rescanned,
/// so braces in element data reach the output verbatim.
#[must_use]
pub fn render_template(template: &str, fields: &BTreeMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| fields.get(&after[..close]).map(|value| (close, value)));
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for a single-quoted string literal (JS, TS and Python)
#[must_use]
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Owned element lookup expression source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Lookup {
    /// Lookup for an element (selector, else locator path)
    #[must_use]
    pub fn for_element(element: &Element) -> Self {
        match element.locator() {
            Locator::Css(css) => Self::Css(css.to_string()),
            Locator::XPath(xpath) => Self::XPath(xpath.to_string()),
        }
    }

    /// Descendant lookup scoped under this one
    #[must_use]
    pub fn descendant(&self, css: &str, xpath: &str) -> Self {
        match self {
            Self::Css(base) => Self::Css(format!("{base} {css}")),
            Self::XPath(base) => Self::XPath(format!("{base}//{xpath}")),
        }
    }

    /// Framework expression that resolves this lookup
    #[must_use]
    pub fn expression(&self, framework: Framework) -> String {
        match (framework, self) {
            (Framework::Playwright, Self::Css(css)) => {
                format!("page.locator('{}')", quote_literal(css))
            }
            (Framework::Playwright, Self::XPath(xpath)) => {
                format!("page.locator('xpath={}')", quote_literal(xpath))
            }
            (Framework::Selenium, Self::Css(css)) => {
                format!("driver.find_element(By.CSS_SELECTOR, '{}')", quote_literal(css))
            }
            (Framework::Selenium, Self::XPath(xpath)) => {
                format!("driver.find_element(By.XPATH, '{}')", quote_literal(xpath))
            }
            (Framework::Cypress, Self::Css(css)) => format!("cy.get('{}')", quote_literal(css)),
            (Framework::Cypress, Self::XPath(xpath)) => {
                format!("cy.xpath('{}')", quote_literal(xpath))
            }
        }
    }
}

/// Pre-click assertions (visible and enabled) for a click template
#[must_use]
pub fn click_checks(framework: Framework, target: &str) -> String {
    match framework {
        Framework::Playwright => "  await expect(target).toBeVisible();\n  await expect(target).toBeEnabled();\n".to_string(),
        Framework::Selenium => "        assert target.is_displayed()\n        assert target.is_enabled()\n".to_string(),
        Framework::Cypress => format!("    {target}.should('be.visible').and('be.enabled');\n"),
    }
}

/// Post-fill value assertion for a fill template
#[must_use]
pub fn fill_checks(framework: Framework, target: &str, value: &str) -> String {
    let value = quote_literal(value);
    match framework {
        Framework::Playwright => format!("  await expect(field).toHaveValue('{value}');\n"),
        Framework::Selenium => {
            format!("        assert field.get_attribute('value') == '{value}'\n")
        }
        Framework::Cypress => format!("    {target}.should('have.value', '{value}');\n"),
    }
}

/// Navigation step of the workflow: follow a link when one was discovered,
/// otherwise reload the base URL
#[must_use]
pub fn navigation_step(framework: Framework, link: Option<(&Lookup, &str)>, base_url: &str) -> String {
    let base_url = quote_literal(base_url);
    match (framework, link) {
        (Framework::Playwright, Some((lookup, href))) => format!(
            "    await {}.click();\n    await expect(page).toHaveURL('{}');\n",
            lookup.expression(framework),
            quote_literal(href)
        ),
        (Framework::Playwright, None) => format!("    await page.goto('{base_url}');\n"),
        (Framework::Selenium, Some((lookup, href))) => format!(
            "        {}.click()\n        assert driver.current_url == '{}'\n",
            lookup.expression(framework),
            quote_literal(href)
        ),
        (Framework::Selenium, None) => format!("        driver.get('{base_url}')\n"),
        (Framework::Cypress, Some((lookup, href))) => format!(
            "    {}.click();\n    cy.url().should('eq', '{}');\n",
            lookup.expression(framework),
            quote_literal(href)
        ),
        (Framework::Cypress, None) => format!("    cy.visit('{base_url}');\n"),
    }
}
