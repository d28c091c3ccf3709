//! RealWorld E2E Test Suite
//!
//! This crate drives the RealWorld ("Conduit") frontend through a real
//! browser and checks its authentication, comment and settings flows:
//! - Spawns chromedriver as a subprocess (or attaches to a running WebDriver)
//! - Speaks the W3C WebDriver protocol over HTTP
//! - Wraps each screen in a page object built on explicit waits
//! - Registers scenarios with ids, suites and data markers and runs them
//!   sequentially in one browser session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start() -> DriverService + WebDriverClient           │
//! │    ├── run(scenarios, data) -> TestSuiteResult              │
//! │    ├── save_screenshot(id) on failure                       │
//! │    └── reset_browser() between scenarios                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (auth / comment / settings)                       │
//! │    ├── id, name, suite, marker                              │
//! │    └── run(ScenarioContext) -> E2eResult<()>                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects                                               │
//! │    ├── BasePage: find, click, type_text, waits, storage     │
//! │    ├── Home, Login, Signup, Settings, Profile, Article      │
//! │    └── locators::* constants                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Browser trait                                              │
//! │    └── WebDriverClient (reqwest)                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod fixtures;
pub mod locator;
pub mod locators;
pub mod pages;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod wait;
pub mod webdriver;

pub use config::{Environment, SuiteConfig};
pub use error::{E2eError, E2eResult};
pub use fixtures::{Credentials, TestData};
pub use locator::Locator;
pub use runner::{RunnerConfig, TestResult, TestRunner, TestSuiteResult};
pub use scenario::{Marker, Scenario, ScenarioContext, ScenarioFilter, Suite};
pub use webdriver::{Browser, Capabilities, DriverService, ServiceConfig, WebDriverClient};
