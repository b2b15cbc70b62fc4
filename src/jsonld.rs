use serde::Serialize;

use crate::config::Settings;
use crate::content::{Page, Rating};
use crate::error::EmitError;
use crate::render::plain_text;

const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thing {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingJsonLd {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub rating_value: f64,
    pub best_rating: f64,
    pub worst_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewJsonLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub item_reviewed: Thing,
    pub review_rating: RatingJsonLd,
    pub author: Thing,
    pub date_published: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerJsonLd {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionJsonLd {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub accepted_answer: AnswerJsonLd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPageJsonLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub main_entity: Vec<QuestionJsonLd>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleJsonLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date_published: String,
    pub date_modified: String,
    pub author: Thing,
    pub publisher: Thing,
    pub main_entity_of_page: String,
}

/// A public rating has to sit inside the scale; out-of-range values are
/// rejected, never clamped.
pub fn check_rating(rating: &Rating, best: f64) -> Result<(), EmitError> {
    if rating.value.is_finite() && (0.0..=best).contains(&rating.value) {
        Ok(())
    } else {
        Err(EmitError::InvalidRating {
            value: rating.value,
            best,
        })
    }
}

/// `Review` block for pages that carry review metadata. Rating and date are
/// taken from the page's canonical fields.
pub fn emit_review(page: &Page, best: f64) -> Result<Option<ReviewJsonLd>, EmitError> {
    let (Some(review), Some(rating)) = (&page.review, &page.rating) else {
        return Ok(None);
    };
    check_rating(rating, best)?;

    Ok(Some(ReviewJsonLd {
        context: SCHEMA_CONTEXT,
        kind: "Review",
        item_reviewed: Thing {
            kind: review.item_type.clone(),
            name: review.item_name.clone(),
        },
        review_rating: RatingJsonLd {
            kind: "Rating",
            rating_value: rating.value,
            best_rating: best,
            worst_rating: 0.0,
        },
        author: Thing {
            kind: "Person".into(),
            name: review.author.clone(),
        },
        date_published: page.published.to_string(),
    }))
}

/// `FAQPage` built from the same FAQ items that are rendered on the page.
/// Pages without FAQ sections get no block at all.
pub fn emit_faq_page(page: &Page) -> Option<FaqPageJsonLd> {
    if !page.has_faq() {
        return None;
    }
    Some(FaqPageJsonLd {
        context: SCHEMA_CONTEXT,
        kind: "FAQPage",
        main_entity: page
            .faq_items()
            .map(|item| QuestionJsonLd {
                kind: "Question",
                name: plain_text(&item.question),
                accepted_answer: AnswerJsonLd {
                    kind: "Answer",
                    text: plain_text(&item.answer),
                },
            })
            .collect(),
    })
}

pub fn emit_article(page: &Page, settings: &Settings) -> ArticleJsonLd {
    let author = match &page.review {
        Some(r) => Thing {
            kind: "Person".into(),
            name: r.author.clone(),
        },
        None => Thing {
            kind: "Organization".into(),
            name: settings.publisher.clone(),
        },
    };
    ArticleJsonLd {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline: page.title.clone(),
        description: page.description.clone(),
        date_published: page.published.to_string(),
        date_modified: page.modified().to_string(),
        author,
        publisher: Thing {
            kind: "Organization".into(),
            name: settings.publisher.clone(),
        },
        main_entity_of_page: settings.page_url(&page.id),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, EmitError> {
    serde_json::to_string_pretty(value).map_err(|e| EmitError::Serialize(e.to_string()))
}

/// Every JSON-LD block for a page, serialized: Article, then Review and
/// FAQPage when they apply.
pub fn emit_all(page: &Page, settings: &Settings) -> Result<Vec<String>, EmitError> {
    if let Some(rating) = &page.rating {
        check_rating(rating, settings.best_rating)?;
    }

    let mut blocks = vec![to_json(&emit_article(page, settings))?];
    if let Some(review) = emit_review(page, settings.best_rating)? {
        blocks.push(to_json(&review)?);
    }
    if let Some(faq) = emit_faq_page(page) {
        blocks.push(to_json(&faq)?);
    }
    Ok(blocks)
}
