// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML pages
//!
//! Pages share one layout (`templates/layout.html`) with `{{TOKEN}}`
//! placeholders. Each page supplies its content fragment and a closure that
//! fills page-specific tokens; anything left unfilled is blanked.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use tracing::debug;

use super::http_server::AppState;
use super::predict::PredictionOutcome;
use crate::decision::Label;
use crate::report::TIMESTAMP_FORMAT;

const LAYOUT: &str = include_str!("templates/layout.html");
const HOME: &str = include_str!("templates/home.html");
const RESULT: &str = include_str!("templates/result.html");
const RECOMMENDATIONS: &str = include_str!("templates/recommendations.html");
const FAQ: &str = include_str!("templates/faq.html");
const DISCLAIMER: &str = include_str!("templates/disclaimer.html");
const ANALYTICS: &str = include_str!("templates/analytics.html");
const ERROR: &str = include_str!("templates/error.html");

/// Query flag set when the form flow bounces an unreadable upload
pub const INVALID_IMAGE_FLAG: &str = "invalid-image";

/// Render `content` inside the shared layout
pub fn render_page<F>(title: &str, content: &str, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let html = LAYOUT
        .replace("{{TITLE}}", &html_escape(title))
        .replace("{{CONTENT}}", content);
    blank_remaining(fill(html))
}

/// Replace any `{{TOKEN}}` nobody filled with an empty string
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        match html[start..].find("}}") {
            Some(end) => html.replace_range(start..start + end + 2, ""),
            None => break,
        }
    }
    html
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_result(outcome: &PredictionOutcome) -> String {
    let decision = &outcome.prediction.decision;
    let label_class = match decision.label {
        Label::Positive => "positive",
        Label::Negative => "negative",
    };
    let report_url = outcome.report_url();

    render_page("Result", RESULT, |html| {
        html.replace("{{LABEL_CLASS}}", label_class)
            .replace("{{LABEL}}", &html_escape(decision.label.display_name()))
            .replace("{{CONFIDENCE}}", &html_escape(&decision.confidence_percent()))
            .replace(
                "{{GENERATED}}",
                &outcome.generated_at.format(TIMESTAMP_FORMAT).to_string(),
            )
            .replace("{{REPORT_URL}}", &html_escape(&report_url))
    })
}

pub fn render_error(message: &str) -> String {
    render_page("Error", ERROR, |html| {
        html.replace("{{MESSAGE}}", &html_escape(message))
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub error: Option<String>,
}

/// GET / - upload form; counts the visit
pub async fn home_handler(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Html<String> {
    let visitors = state.visitors.increment_and_get();
    debug!(visitors, "Home page visit");

    let notice = match query.error.as_deref() {
        Some(INVALID_IMAGE_FLAG) => {
            "<p class=\"notice\">The uploaded file could not be read as an image. Please try another file.</p>"
        }
        Some(_) => "<p class=\"notice\">Your request could not be processed. Please try again.</p>",
        None => "",
    };

    Html(render_page("Home", HOME, |html| {
        html.replace("{{VISITORS}}", &visitors.to_string())
            .replace("{{NOTICE}}", notice)
    }))
}

pub async fn recommendations_handler() -> Html<String> {
    Html(render_page("Recommendations", RECOMMENDATIONS, |html| html))
}

pub async fn faq_handler() -> Html<String> {
    Html(render_page("FAQ", FAQ, |html| html))
}

pub async fn disclaimer_handler() -> Html<String> {
    Html(render_page("Disclaimer", DISCLAIMER, |html| html))
}

/// GET /analytics - read-only counters
pub async fn analytics_handler(State(state): State<AppState>) -> Html<String> {
    let visitors = state.visitors.current();
    let predictions = state.predictions.current();
    let reports = state.reports.len().await;
    let threshold = state.predictor.policy().threshold();

    Html(render_page("Analytics", ANALYTICS, |html| {
        html.replace("{{VISITORS}}", &visitors.to_string())
            .replace("{{PREDICTIONS}}", &predictions.to_string())
            .replace("{{REPORTS}}", &reports.to_string())
            .replace("{{THRESHOLD}}", &format!("{:.2}", threshold))
    }))
}
