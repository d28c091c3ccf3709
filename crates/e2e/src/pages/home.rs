//! Home page and navigation bar

use crate::error::E2eResult;
use crate::locators::{article, home};
use crate::pages::page_object;

page_object!(
    /// `#/`: feed tabs, article previews and the top navigation
    HomePage
);

impl<'a> HomePage<'a> {
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open("").await
    }

    pub async fn is_page_loaded(&self) -> E2eResult<bool> {
        self.is_element_visible(&home::HOME_PAGE).await
    }

    /// Username shown in the logged-in navigation bar
    pub async fn navigate_user_name(&self) -> E2eResult<String> {
        self.text(&home::NAV_USER_LINK).await
    }

    pub async fn click_global_feed_tab(&self) -> E2eResult<()> {
        self.click(&home::GLOBAL_FEED_TAB).await?;
        // An empty feed is legitimate; callers assert on the titles
        self.is_element_visible(&home::ARTICLE_PREVIEW).await?;
        Ok(())
    }

    pub async fn article_titles(&self) -> E2eResult<Vec<String>> {
        let mut titles = Vec::new();
        for element in self.find_all(&home::ARTICLE_TITLES).await? {
            titles.push(self.browser().text(&element).await?.trim().to_string());
        }
        Ok(titles)
    }

    pub async fn open_first_article(&self) -> E2eResult<()> {
        self.click(&home::ARTICLE_PREVIEW).await?;
        self.find(&article::ARTICLE_PAGE).await?;
        Ok(())
    }

    pub async fn nav_user_pic_src(&self) -> E2eResult<Option<String>> {
        self.attribute(&home::NAV_USER_PIC, "src").await
    }

    pub async fn click_logo(&self) -> E2eResult<()> {
        self.click(&home::LOGO).await
    }
}
