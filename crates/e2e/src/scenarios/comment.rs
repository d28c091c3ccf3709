//! Article comment scenarios (COM-AUTO-*)

use std::future::Future;

use tracing::{info, warn};

use crate::check;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::TestData;
use crate::locators::{article, home as home_loc};
use crate::scenario::{Marker, Scenario, ScenarioContext, Suite};
use crate::scenarios::go_to_first_article;

/// Seeded account whose global feed holds fewer than ten articles
const COMMENTER: &str = "belowTenArticlesUser";

fn comment<F, Fut>(id: impl Into<String>, name: impl Into<String>, marker: Marker, run: F) -> Scenario
where
    F: Fn(ScenarioContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    Scenario::new(id, name, Suite::Comment, marker, run)
}

pub fn scenarios(data: &TestData) -> Vec<Scenario> {
    use Marker::*;
    let mut scenarios = vec![
        comment("COM-AUTO-001", "add comment shows a complete card", DataRequiredBelowTenArticles, add_comment),
        comment("COM-AUTO-002", "long English comment fits", DataRequiredBelowTenArticles, |ctx| {
            comment_fits(ctx, "longEnComment")
        }),
        comment("COM-AUTO-003", "long special-character comment fits", DataRequiredBelowTenArticles, |ctx| {
            comment_fits(ctx, "longSpecialCharComment")
        }),
        comment("COM-AUTO-004", "long numeric comment fits", DataRequiredBelowTenArticles, |ctx| {
            comment_fits(ctx, "longNumComment")
        }),
        comment("COM-AUTO-005", "multiline comment keeps line breaks", DataRequiredBelowTenArticles, multiline_comment),
        comment("COM-AUTO-006", "delete comment", DataRequiredBelowTenArticles, delete_comment),
        comment("COM-AUTO-007", "empty comment is rejected", DataNotRequired, empty_comment),
    ];

    // One run per fixture comment
    let texts = data.texts("addComment").unwrap_or_else(|e| {
        warn!("No parametrized comments: {}", e);
        Vec::new()
    });
    for (i, text) in texts.into_iter().enumerate() {
        scenarios.push(comment(
            format!("COM-AUTO-008[{}]", i),
            format!("new comment keeps the first one ({})", text),
            DataRequired,
            move |ctx| new_comment_keeps_first(ctx, text.clone()),
        ));
    }

    scenarios.push(comment(
        "COM-AUTO-009",
        "logged-out article has no comment form",
        DataNotRequired,
        logged_out_comment_form,
    ));
    scenarios
}

async fn add_comment(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();
    let text = format!("Automated comment {}", ctx.data().run_id());
    page.add_comment(&text).await?;

    let comments = page.comments().await?;
    check!(
        comments.last().is_some_and(|last| last.contains(&text)),
        "newest comment is not {:?}: {:?}",
        text,
        comments.last()
    );

    let card = page.last_comment_card().await?;
    for (part, label) in [
        (&article::COMMENT_AUTHOR_IMAGE, "author image"),
        (&article::COMMENT_AUTHOR, "author link"),
        (&article::COMMENT_DATE, "date"),
        (&article::COMMENT_DELETE, "delete icon"),
    ] {
        check!(page.card_part_visible(&card, part).await?, "comment card has no {}", label);
    }
    Ok(())
}

/// Post the fixture comment `key` and require the card to stay inside its container
async fn comment_fits(ctx: ScenarioContext, key: &'static str) -> E2eResult<()> {
    let text = ctx.data().text(key)?;
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();
    page.add_comment(&text).await?;

    let card = page.comment_card_width().await?;
    let container = page.comment_container_width().await?;
    info!("Comment card {}px, container {}px", card, container);
    check!(card <= container, "comment card ({}px) overflows its container ({}px)", card, container);
    Ok(())
}

async fn multiline_comment(ctx: ScenarioContext) -> E2eResult<()> {
    let text = ctx.data().text("newLineComment")?;
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();
    page.add_comment(&text).await?;

    let html = page.last_comment_html().await?;
    check!(
        html.contains("<br>") || html.contains("<p>") || html.contains('\n'),
        "line break lost in comment markup: {}",
        html
    );
    Ok(())
}

async fn delete_comment(ctx: ScenarioContext) -> E2eResult<()> {
    let text = ctx.data().text("deleteComment")?;
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();

    if !page.comments().await?.iter().any(|c| c.contains(&text)) {
        page.add_comment(&text).await?;
    }
    let comments = page.comments().await?;
    let index = comments
        .iter()
        .position(|c| c.contains(&text))
        .ok_or_else(|| E2eError::AssertionFailed(format!("comment {:?} not found after posting", text)))?;
    page.delete_comment_by_index(index).await?;

    let remaining = page.comments().await?;
    check!(
        !remaining.iter().any(|c| c.contains(&text)),
        "comment {:?} still listed after delete",
        text
    );
    Ok(())
}

async fn empty_comment(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();
    let before = page.comment_count().await?;
    page.add_comment("").await?;

    let browser = ctx.browser();
    let changed = page
        .short_wait()
        .until("comment count to change", move || async move {
            let count = browser.find_elements(&article::COMMENT_CARDS).await?.len();
            Ok((count != before).then_some(count))
        })
        .await;
    match changed {
        Ok(after) => Err(E2eError::AssertionFailed(format!(
            "empty comment changed the count from {} to {}",
            before, after
        ))),
        Err(E2eError::Timeout(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

async fn new_comment_keeps_first(ctx: ScenarioContext, text: String) -> E2eResult<()> {
    go_to_first_article(&ctx, COMMENTER).await?;
    let page = ctx.article();
    let before = page.comments().await?;
    page.add_comment(&text).await?;

    let after = page.comments().await?;
    check!(
        after.len() == before.len() + 1,
        "comment count went from {} to {}",
        before.len(),
        after.len()
    );
    check!(
        after.last() == Some(&text),
        "newest comment is {:?}, expected {:?}",
        after.last(),
        text
    );
    if let Some(first) = before.first() {
        check!(
            after.first() == Some(first),
            "first comment changed from {:?} to {:?}",
            first,
            after.first()
        );
    }
    Ok(())
}

async fn logged_out_comment_form(ctx: ScenarioContext) -> E2eResult<()> {
    let home = ctx.home();
    home.navigate().await?;
    check!(!home.is_element_present(&home_loc::NAV_USER_LINK).await?, "still logged in");
    home.click_global_feed_tab().await?;
    check!(!home.article_titles().await?.is_empty(), "global feed has no articles");
    home.open_first_article().await?;

    let page = ctx.article();
    check!(!page.has_comment_form().await?, "comment form shown while logged out");
    Ok(())
}
