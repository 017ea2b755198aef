use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adapter::{Authenticated, HttpReviewsApi, ReviewsApi, Session};
use domain::{protocol, User};
use storage::Notifications;
use storefront::settings::Settings;
use storefront::ReviewsPage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;
    let product_code = std::env::args()
        .nth(1)
        .context("Usage: storefront <product-code>")?;

    let session = match (&settings.api.user_id, &settings.api.token) {
        (Some(id), token) => Session::signed_in(
            User {
                id: id.clone(),
                name: settings.api.user_name.clone().unwrap_or_else(|| id.clone()),
            },
            token.clone(),
        ),
        (None, _) => Session::anonymous(),
    };

    let http = HttpReviewsApi::new(&settings.api.base_url, settings.timeout(), session.clone())
        .context("Failed to build HTTP client")?;
    let api: Arc<dyn ReviewsApi> = Arc::new(Authenticated::new(http, session.clone()));
    let notifications = Notifications::new(settings.toast_durations());

    let page = ReviewsPage::new(
        product_code,
        api,
        session,
        notifications.clone(),
        settings.page_options(),
    );

    info!("Loading reviews of {}", page.product_code());
    page.mount().await;

    let state = page.reviews().snapshot();
    if let Some(error) = &state.error {
        println!("Could not load reviews: {}", error);
        return Ok(());
    }

    println!(
        "{} review(s), page {} of {}",
        state.reviews.pagination.total_elements,
        state.reviews.pagination.page + 1,
        state.reviews.pagination.total_pages.max(1)
    );
    for review in &state.reviews.data {
        println!(
            "  [{}] {}/5 by {} ({} likes, {} dislikes, {} comments)",
            review.review_id,
            review.rating,
            review.customer_name,
            review.reactions.likes,
            review.reactions.dislikes,
            review.total_comments
        );
        if !review.content.is_empty() {
            println!("      {}", review.content);
        }
    }

    let first_with_comments = state.reviews.data.iter().find(|r| r.total_comments > 0);
    if let Some(review) = first_with_comments {
        page.toggle_comments(&review.review_id).await?;
        if let Some(thread) = page.comments().thread(&review.review_id) {
            println!("Comments on {}:", review.review_id);
            for comment in &thread.comments {
                let mentions = protocol::mentions(&comment.content);
                println!(
                    "  - {}: {}{}",
                    comment.customer_name,
                    comment.content,
                    if mentions.is_empty() {
                        String::new()
                    } else {
                        format!("  (mentions: {})", mentions.join(", "))
                    }
                );
            }
            if thread.has_more {
                println!("  ... {} more", (thread.total as usize).saturating_sub(thread.comments.len()));
            }
        }
    }

    println!("Pages: {:?}", page.page_numbers());
    for toast in notifications.toasts() {
        println!("[{:?}] {}", toast.kind, toast.message);
    }
    Ok(())
}
