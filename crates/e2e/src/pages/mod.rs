//! Page objects for the RealWorld frontend
//!
//! Each page wraps a [`BasePage`] and derefs to it, so the generic helpers
//! (`find`, `click`, `type_text`, waits, localStorage) are available on every
//! page alongside its own operations.

macro_rules! page_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            base: $crate::pages::BasePage<'a>,
        }

        impl<'a> $name<'a> {
            pub fn new(
                browser: &'a dyn $crate::webdriver::Browser,
                config: &'a $crate::config::SuiteConfig,
            ) -> Self {
                Self {
                    base: $crate::pages::BasePage::new(browser, config),
                }
            }
        }

        impl<'a> std::ops::Deref for $name<'a> {
            type Target = $crate::pages::BasePage<'a>;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }
    };
}

pub(crate) use page_object;

mod base;
pub mod article;
pub mod home;
pub mod login;
pub mod profile;
pub mod settings;
pub mod signup;

pub use article::ArticlePage;
pub use base::BasePage;
pub use home::HomePage;
pub use login::LoginPage;
pub use profile::ProfilePage;
pub use settings::{SettingsForm, SettingsPage};
pub use signup::SignupPage;

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use crate::config::SuiteConfig;

    /// Millisecond timeouts so negative checks stay quick
    pub fn fast_config() -> SuiteConfig {
        SuiteConfig {
            timeout: Duration::from_millis(200),
            wait: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            ..Default::default()
        }
    }
}
