//! HTML report rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use super::scoring::{Category, ScoreResult, Section};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReport {
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

/// Turns a score and its narrative into a shareable document.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, result: &ScoreResult, narrative: &str) -> Result<RenderedReport, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("report narrative is empty")]
    EmptyNarrative,
    #[error("report rendering failed: {0}")]
    Failed(String),
}

pub fn score_color(score: u8) -> &'static str {
    match score {
        80.. => "#27ae60",
        65..=79 => "#3498db",
        50..=64 => "#f39c12",
        35..=49 => "#e67e22",
        _ => "#e74c3c",
    }
}

pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::ExitReady => "#27ae60",
        Category::NearlyReady => "#3498db",
        Category::PreparationNeeded => "#f39c12",
        Category::SignificantGaps => "#e67e22",
        Category::NotReady => "#e74c3c",
    }
}

/// Self-contained single-page HTML report.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReportRenderer;

const STYLE: &str = "\
*{margin:0;padding:0;box-sizing:border-box}\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;line-height:1.6;color:#333;background:#f5f5f5}\
.container{max-width:900px;margin:0 auto;background:#fff;box-shadow:0 0 20px rgba(0,0,0,.1)}\
.header{background:linear-gradient(135deg,#1e3c72 0%,#2a5298 100%);color:#fff;padding:40px;text-align:center}\
.score-section{background:#f8f9fa;padding:40px;text-align:center;border-bottom:3px solid #e0e0e0}\
.overall-score{width:180px;height:180px;border-radius:50%;color:#fff;display:flex;flex-direction:column;align-items:center;justify-content:center;margin:0 auto 20px}\
.overall-score .score{font-size:4em;font-weight:bold;line-height:1}\
.category{display:inline-block;color:#fff;padding:10px 30px;border-radius:25px;font-weight:bold;margin-bottom:30px}\
.section-scores{display:grid;grid-template-columns:repeat(auto-fit,minmax(150px,1fr));gap:20px;margin-top:30px}\
.section-score{background:#fff;padding:20px;border-radius:10px}\
.bar{height:8px;background:#e0e0e0;border-radius:4px;margin-top:8px}\
.bar span{display:block;height:8px;border-radius:4px}\
.flags{background:#fff3cd;border:1px solid #ffeaa7;padding:20px;border-radius:8px;margin:20px 0;text-align:left}\
.adjustments{margin-top:20px;text-align:left;font-size:.9em;color:#555}\
.content{padding:40px}\
.content h2{color:#1e3c72;margin:40px 0 20px;padding-bottom:10px;border-bottom:2px solid #e0e0e0}\
.content h3{color:#2a5298;margin:25px 0 15px}\
.content p{margin-bottom:15px;color:#555}\
.content ul{margin:0 0 20px 30px}\
.footer{background:#333;color:#fff;padding:30px 40px;text-align:center}";

impl ReportRenderer for HtmlReportRenderer {
    fn render(&self, result: &ScoreResult, narrative: &str) -> Result<RenderedReport, RenderError> {
        if narrative.trim().is_empty() {
            return Err(RenderError::EmptyNarrative);
        }

        let generated_at = Utc::now();
        let mut html = String::with_capacity(8 * 1024);

        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Business Exit Readiness Report</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n<div class=\"header\"><h1>Business Exit Readiness Report</h1>\
             <p>Comprehensive Assessment Results</p><p>Generated: {}</p></div>\n",
            generated_at.format("%Y-%m-%d %H:%M UTC")
        );

        let _ = write!(
            html,
            "<div class=\"score-section\">\n<div class=\"overall-score\" style=\"background:{}\">\
             <div class=\"score\">{}</div><div class=\"label\">Overall Score</div></div>\n\
             <div class=\"category\" style=\"background:{}\">{}</div>\n",
            score_color(result.overall),
            result.overall,
            category_color(result.category),
            escape_html(result.category.label())
        );

        if !result.flags.is_empty() {
            html.push_str("<div class=\"flags\"><h4>Special Considerations:</h4><ul>");
            for flag in &result.flags {
                let _ = write!(html, "<li>{}</li>", escape_html(flag.label()));
            }
            html.push_str("</ul></div>\n");
        }

        html.push_str("<div class=\"section-scores\">\n");
        for section in Section::ALL {
            let score = result.sections.get(section);
            let _ = writeln!(
                html,
                "<div class=\"section-score\"><h4>{}</h4><div class=\"score\" style=\"color:{color}\">{score}</div>\
                 <div class=\"bar\"><span style=\"width:{score}%;background:{color}\"></span></div></div>",
                escape_html(section.label()),
                color = score_color(score),
            );
        }
        html.push_str("</div>\n");

        let adjustments = &result.adjustments;
        if !adjustments.multipliers.is_empty() || !adjustments.penalties.is_empty() {
            html.push_str("<div class=\"adjustments\"><ul>");
            for multiplier in &adjustments.multipliers {
                let _ = write!(
                    html,
                    "<li>{} &times;{}</li>",
                    escape_html(multiplier.name),
                    multiplier.factor
                );
            }
            for penalty in &adjustments.penalties {
                let _ = write!(
                    html,
                    "<li>{} &times;{}</li>",
                    escape_html(penalty.name),
                    penalty.factor
                );
            }
            html.push_str("</ul></div>\n");
        }
        html.push_str("</div>\n");

        html.push_str("<div class=\"content\">\n");
        html.push_str(&narrative_to_html(narrative));
        html.push_str("</div>\n");

        html.push_str(
            "<div class=\"footer\"><p><strong>Business Exit Readiness Assessment</strong></p>\
             <p>This report is confidential and proprietary.</p></div>\n</div>\n</body>\n</html>\n",
        );

        Ok(RenderedReport { html, generated_at })
    }
}

/// Minimal markdown: `#`/`##`/`###` headings, `N. ` numbered headings, `- ` bullets, and
/// blank-line separated paragraphs. Every piece of text is escaped.
pub fn narrative_to_html(narrative: &str) -> String {
    let mut html = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_list = false;

    for line in narrative.lines() {
        let trimmed = line.trim();

        if let Some(item) = trimmed.strip_prefix("- ") {
            flush_paragraph(&mut html, &mut paragraph);
            if !in_list {
                html.push_str("<ul>\n");
                in_list = true;
            }
            let _ = writeln!(html, "<li>{}</li>", escape_html(item));
            continue;
        }

        if in_list {
            html.push_str("</ul>\n");
            in_list = false;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut html, &mut paragraph);
        } else if let Some((level, heading)) = heading(trimmed) {
            flush_paragraph(&mut html, &mut paragraph);
            let _ = writeln!(html, "<h{level}>{}</h{level}>", escape_html(heading));
        } else {
            paragraph.push(trimmed);
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }
    flush_paragraph(&mut html, &mut paragraph);
    html
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(text) = line.strip_prefix("### ") {
        return Some((4, text));
    }
    if let Some(text) = line.strip_prefix("## ") {
        return Some((3, text));
    }
    if let Some(text) = line.strip_prefix("# ") {
        return Some((2, text));
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(text) = line[digits..].strip_prefix(". ") {
            return Some((3, text));
        }
    }
    None
}

fn flush_paragraph(html: &mut String, paragraph: &mut Vec<&str>) {
    if paragraph.is_empty() {
        return;
    }
    let _ = writeln!(html, "<p>{}</p>", escape_html(&paragraph.join(" ")));
    paragraph.clear();
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::answers::AnswerSet;
    use crate::assessment::scoring::ScoringEngine;

    #[test]
    fn score_colors_follow_the_palette_boundaries() {
        assert_eq!(score_color(80), "#27ae60");
        assert_eq!(score_color(79), "#3498db");
        assert_eq!(score_color(65), "#3498db");
        assert_eq!(score_color(64), "#f39c12");
        assert_eq!(score_color(50), "#f39c12");
        assert_eq!(score_color(49), "#e67e22");
        assert_eq!(score_color(35), "#e67e22");
        assert_eq!(score_color(34), "#e74c3c");
    }

    #[test]
    fn converts_markdown_and_escapes_text() {
        let html = narrative_to_html(
            "# Summary\n\nScores <improve> when\nowners plan.\n\n- one & two\n- three\n2. Next steps",
        );
        assert!(html.contains("<h2>Summary</h2>"));
        assert!(html.contains("<p>Scores &lt;improve&gt; when owners plan.</p>"));
        assert!(html.contains("<ul>\n<li>one &amp; two</li>\n<li>three</li>\n</ul>"));
        assert!(html.contains("<h3>Next steps</h3>"));
    }

    #[test]
    fn renders_scores_and_rejects_empty_narratives() {
        let result = ScoringEngine::new().score(&AnswerSet::default());
        let rendered = HtmlReportRenderer
            .render(&result, "## Overview\nSteady.")
            .expect("renders");
        assert!(rendered.html.starts_with("<!DOCTYPE html>"));
        assert!(rendered.html.contains(result.category.label()));
        assert!(rendered.html.contains("Owner Readiness"));
        assert!(rendered.html.contains("<h3>Overview</h3>"));

        assert!(matches!(
            HtmlReportRenderer.render(&result, "   \n"),
            Err(RenderError::EmptyNarrative)
        ));
    }
}
