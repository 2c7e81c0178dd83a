//! HTML rendering for the explorer UI.

use pulldown_cmark::{Event, Options, Parser, Tag, html};

use crate::pipeline::{ArtifactStatus, PipelineReport, Stage, StageOutcome};

const TITLE: &str = "InnovateEasy: AI Solutions Explorer for Businesses";

const INSTRUCTIONS: &str = "### Instructions
1. **Enter a Company Name**: Provide the exact company name (e.g., HCL Technologies) for accurate results.
2. **Run Analysis**: Click \"Analyze Company\" to generate research, AI use cases, and resources.
3. **View Results**: Scroll down to see the detailed outputs for each section.
4. **Troubleshooting**: Ensure the company name is specific. Contact support if issues persist.
";

const FOOTER: &str = "InstaResz AI Assignment | Powered by InnovateEasy";

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
.error{background:#fde8e8;color:#9b1c1c;padding:.75rem;border-radius:4px}\
.warning{background:#fdf6b2;color:#723b13;padding:.75rem;border-radius:4px}\
#busy{display:none;color:#555}\
footer{color:#777;font-size:.9rem}";

const SCRIPT: &str = "document.getElementById('analyze').addEventListener('submit',function(){\
var n=document.getElementById('company').value;\
var b=document.getElementById('busy');b.textContent='Analyzing '+n+'...';b.style.display='block';\
document.getElementById('run').disabled=true;});";

/// Escape text for HTML element and attribute context
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Link targets a rendered page may point at
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Scheme-less (relative) targets are safe; otherwise only `SAFE_SCHEMES`.
/// Whitespace and control characters are ignored, as browsers ignore them.
fn is_safe_destination(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme_end = cleaned.find(':');
    let path_start = cleaned.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => {
            let scheme = cleaned[..colon].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        (None, _) => true,
    }
}

/// Markdown to HTML. Raw HTML in the source is shown as text and unsafe
/// link targets are replaced by `#`.
pub fn markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_destination(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: "#".into(),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_destination(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: "#".into(),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn error_box(message: &str) -> String {
    format!("<div class=\"error\">{}</div>\n", escape(message))
}

fn warning_box(message: &str) -> String {
    format!("<div class=\"warning\">{}</div>\n", escape(message))
}

/// Full page around `body`
pub fn page(company: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<h1>{title}</h1>\n\
<form id=\"analyze\" method=\"post\" action=\"/analyze\">\n\
<label for=\"company\">Enter Company Name (e.g., HCL Technologies):</label><br>\n\
<input id=\"company\" name=\"company\" type=\"text\" size=\"40\" value=\"{company}\">\n\
<button id=\"run\" type=\"submit\">Analyze Company</button>\n</form>\n\
<p id=\"busy\"></p>\n{body}<hr>\n{instructions}<hr>\n<footer>{footer}</footer>\n<script>{script}</script>\n</body>\n</html>\n",
        title = TITLE,
        style = STYLE,
        company = escape(company),
        body = body,
        instructions = markdown(INSTRUCTIONS),
        footer = escape(FOOTER),
        script = SCRIPT,
    )
}

pub fn input_error(company: &str, message: &str) -> String {
    page(company, &error_box(message))
}

pub fn run_error(company: &str, message: &str) -> String {
    page(
        company,
        &error_box(&format!("Error running analysis: {}", message)),
    )
}

fn outcome_section(stage: Stage, outcome: Option<&StageOutcome>) -> String {
    let mut html = format!("<section id=\"{}\">\n<h3>{}</h3>\n", stage.slug(), stage.title());
    match (outcome, stage.previous()) {
        (Some(outcome), _) => html.push_str(&markdown(outcome.text())),
        (None, Some(previous)) => html.push_str(&warning_box(&format!(
            "{} was not run because the {} did not produce a valid result.",
            stage.label(),
            previous.label()
        ))),
        (None, None) => html.push_str(&warning_box(&format!("{} was not run.", stage.label()))),
    }
    html.push_str("</section>\n<hr>\n");
    html
}

/// Analysis results from a finished run
pub fn report(report: &PipelineReport) -> String {
    let mut body = format!(
        "<h2>Analysis for {}</h2>\n<hr>\n",
        escape(report.company.as_str())
    );
    for stage in Stage::ALL {
        body.push_str(&outcome_section(stage, report.outcome(stage)));
    }
    page(report.company.as_str(), &body)
}

/// A persisted artifact as found on disk
pub fn artifact(default_company: &str, stage: Stage, status: &ArtifactStatus) -> String {
    let file = stage.artifact_file();
    let mut body = format!("<h3>{}</h3>\n", stage.title());
    match status {
        ArtifactStatus::Ready { content } => body.push_str(&markdown(content)),
        ArtifactStatus::Empty => {
            body.push_str(&warning_box(&format!("{} is empty.", file)));
        }
        ArtifactStatus::Missing => {
            body.push_str(&error_box(&format!("{} not found.", file)));
        }
        ArtifactStatus::Unreadable { error } => {
            body.push_str(&error_box(&format!("Failed to read {}: {}", file, error)));
        }
    }
    page(default_company, &body)
}
