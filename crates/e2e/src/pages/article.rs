//! Article page comment section

use serde_json::Value;
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::locators::article;
use crate::pages::page_object;
use crate::webdriver::ElementRef;

page_object!(
    /// `#/article/:slug`
    ArticlePage
);

impl<'a> ArticlePage<'a> {
    /// Type a comment and post it; non-blank comments wait for the new card
    pub async fn add_comment(&self, text: &str) -> E2eResult<()> {
        let before = self.comment_count().await?;
        info!("Posting comment ({} chars) after {} existing", text.chars().count(), before);

        self.type_text(&article::COMMENT_INPUT, text).await?;
        self.click(&article::POST_COMMENT_BUTTON).await?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let browser = self.browser();
        self.wait()
            .until("new comment card", move || async move {
                let count = browser.find_elements(&article::COMMENT_CARDS).await?.len();
                Ok((count > before).then_some(()))
            })
            .await
    }

    /// Comment texts in page order
    pub async fn comments(&self) -> E2eResult<Vec<String>> {
        let browser = self.browser();
        let mut texts = Vec::new();
        for card in self.find_all(&article::COMMENT_CARDS).await? {
            if let Some(body) = browser.find_child_elements(&card, &article::COMMENT_TEXT).await?.first() {
                texts.push(browser.text(body).await?.trim().to_string());
            }
        }
        Ok(texts)
    }

    pub async fn comment_count(&self) -> E2eResult<usize> {
        Ok(self.find_all(&article::COMMENT_CARDS).await?.len())
    }

    pub async fn last_comment_card(&self) -> E2eResult<ElementRef> {
        self.wait().present(&article::LAST_COMMENT_CARD).await
    }

    /// Raw markup of the newest card, for line-break checks
    pub async fn last_comment_html(&self) -> E2eResult<String> {
        let card = self.last_comment_card().await?;
        Ok(match self.browser().property(&card, "innerHTML").await? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    /// Whether a part of `card` (author image, date, trash icon) is shown
    pub async fn card_part_visible(&self, card: &ElementRef, part: &Locator) -> E2eResult<bool> {
        let browser = self.browser();
        match browser.find_child_elements(card, part).await?.first() {
            Some(element) => browser.is_displayed(element).await,
            None => Ok(false),
        }
    }

    /// Click the trash icon of the `index`th card and wait for it to go
    pub async fn delete_comment_by_index(&self, index: usize) -> E2eResult<()> {
        let browser = self.browser();
        let cards = self.find_all(&article::COMMENT_CARDS).await?;
        let before = cards.len();
        let card = cards.get(index).ok_or_else(|| {
            E2eError::AssertionFailed(format!("no comment at index {} ({} comments)", index, before))
        })?;

        let trash = browser
            .find_child_elements(card, &article::COMMENT_DELETE)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::AssertionFailed(format!("comment {} has no delete icon", index)))?;
        browser.click(&trash).await?;

        self.wait()
            .until("comment removal", move || async move {
                let count = browser.find_elements(&article::COMMENT_CARDS).await?.len();
                Ok((count < before).then_some(()))
            })
            .await
    }

    pub async fn comment_card_width(&self) -> E2eResult<f64> {
        let card = self.last_comment_card().await?;
        Ok(self.browser().rect(&card).await?.width)
    }

    pub async fn comment_container_width(&self) -> E2eResult<f64> {
        let container = self.wait().present(&article::COMMENT_CONTAINER).await?;
        Ok(self.browser().rect(&container).await?.width)
    }

    /// Comment textarea or post button present
    pub async fn has_comment_form(&self) -> E2eResult<bool> {
        Ok(self.is_element_present(&article::COMMENT_INPUT).await?
            || self.is_element_present(&article::POST_COMMENT_BUTTON).await?)
    }
}
