//! Scenario registry types and filtering

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::TestData;
use crate::pages::{ArticlePage, BasePage, HomePage, LoginPage, ProfilePage, SettingsPage, SignupPage};
use crate::webdriver::Browser;

/// Feature area a scenario belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Auth,
    Comment,
    Settings,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Suite::Auth => "auth",
            Suite::Comment => "comment",
            Suite::Settings => "settings",
        })
    }
}

/// What a scenario expects to already exist in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Pre-seeded accounts from the fixture file
    #[value(name = "data_required")]
    DataRequired,
    /// Creates whatever it needs
    #[value(name = "data_not_required")]
    DataNotRequired,
    /// Seeded account whose global feed has fewer than ten articles
    #[value(name = "data_required_below_ten_articles")]
    DataRequiredBelowTenArticles,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::DataRequired => "data_required",
            Marker::DataNotRequired => "data_not_required",
            Marker::DataRequiredBelowTenArticles => "data_required_below_ten_articles",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data_required" => Ok(Marker::DataRequired),
            "data_not_required" => Ok(Marker::DataNotRequired),
            "data_required_below_ten_articles" => Ok(Marker::DataRequiredBelowTenArticles),
            other => Err(E2eError::UnknownMarker(other.to_string())),
        }
    }
}

/// Everything a running scenario can reach
#[derive(Clone)]
pub struct ScenarioContext {
    browser: Arc<dyn Browser>,
    config: Arc<SuiteConfig>,
    data: Arc<TestData>,
}

impl ScenarioContext {
    pub fn new(browser: Arc<dyn Browser>, config: Arc<SuiteConfig>, data: Arc<TestData>) -> Self {
        Self { browser, config, data }
    }

    pub fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn data(&self) -> &TestData {
        &self.data
    }

    pub fn base(&self) -> BasePage<'_> {
        BasePage::new(self.browser(), self.config())
    }

    pub fn home(&self) -> HomePage<'_> {
        HomePage::new(self.browser(), self.config())
    }

    pub fn login(&self) -> LoginPage<'_> {
        LoginPage::new(self.browser(), self.config())
    }

    pub fn signup(&self) -> SignupPage<'_> {
        SignupPage::new(self.browser(), self.config())
    }

    pub fn settings(&self) -> SettingsPage<'_> {
        SettingsPage::new(self.browser(), self.config())
    }

    pub fn profile(&self) -> ProfilePage<'_> {
        ProfilePage::new(self.browser(), self.config())
    }

    pub fn article(&self) -> ArticlePage<'_> {
        ArticlePage::new(self.browser(), self.config())
    }
}

type ScenarioFn = Arc<dyn Fn(ScenarioContext) -> BoxFuture<'static, E2eResult<()>> + Send + Sync>;

/// A registered end-to-end scenario
#[derive(Clone)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub suite: Suite,
    pub marker: Marker,
    run: ScenarioFn,
}

impl Scenario {
    pub fn new<F, Fut>(
        id: impl Into<String>,
        name: impl Into<String>,
        suite: Suite,
        marker: Marker,
        run: F,
    ) -> Self
    where
        F: Fn(ScenarioContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            suite,
            marker,
            run: Arc::new(move |ctx| Box::pin(run(ctx))),
        }
    }

    pub fn run(&self, ctx: ScenarioContext) -> BoxFuture<'static, E2eResult<()>> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("marker", &self.marker)
            .finish()
    }
}

/// Selection criteria; an empty list matches everything
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub suites: Vec<Suite>,
    pub markers: Vec<Marker>,
    /// Case-insensitive substring of the id or name
    pub name: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if !self.suites.is_empty() && !self.suites.contains(&scenario.suite) {
            return false;
        }
        if !self.markers.is_empty() && !self.markers.contains(&scenario.marker) {
            return false;
        }
        match &self.name {
            Some(needle) => {
                let needle = needle.to_lowercase();
                scenario.id.to_lowercase().contains(&needle)
                    || scenario.name.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_ctx: ScenarioContext) -> E2eResult<()> {
        Ok(())
    }

    fn sample() -> Vec<Scenario> {
        vec![
            Scenario::new("AUTH-AUTO-001", "successful signup", Suite::Auth, Marker::DataNotRequired, noop),
            Scenario::new("AUTH-AUTO-011", "successful login", Suite::Auth, Marker::DataRequired, noop),
            Scenario::new(
                "COM-AUTO-001",
                "add comment",
                Suite::Comment,
                Marker::DataRequiredBelowTenArticles,
                noop,
            ),
        ]
    }

    fn ids(scenarios: &[Scenario]) -> Vec<&str> {
        scenarios.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_marker_parse_and_display() {
        for marker in [
            Marker::DataRequired,
            Marker::DataNotRequired,
            Marker::DataRequiredBelowTenArticles,
        ] {
            assert_eq!(marker.as_str().parse::<Marker>().unwrap(), marker);
        }
        assert_eq!(Suite::Comment.to_string(), "comment");
    }

    #[test]
    fn test_unknown_marker_names_the_marker() {
        let err = "slow".parse::<Marker>().unwrap_err();
        assert!(matches!(&err, E2eError::UnknownMarker(m) if m == "slow"));
        assert!(err.to_string().starts_with("Unknown marker: slow"));
        assert!(err.to_string().contains("data_required_below_ten_articles"));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert_eq!(ScenarioFilter::default().apply(sample()).len(), 3);
    }

    #[test]
    fn test_filter_by_suite_marker_and_name() {
        let by_suite = ScenarioFilter {
            suites: vec![Suite::Auth],
            ..Default::default()
        };
        assert_eq!(ids(&by_suite.apply(sample())), vec!["AUTH-AUTO-001", "AUTH-AUTO-011"]);

        let by_marker = ScenarioFilter {
            markers: vec![Marker::DataRequired],
            ..Default::default()
        };
        assert_eq!(ids(&by_marker.apply(sample())), vec!["AUTH-AUTO-011"]);

        let by_name = ScenarioFilter {
            name: Some("COMMENT".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_name.apply(sample())), vec!["COM-AUTO-001"]);

        let by_id = ScenarioFilter {
            name: Some("auth-auto-001".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_id.apply(sample())), vec!["AUTH-AUTO-001"]);
    }
}
