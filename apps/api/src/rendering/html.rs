//! HTML assembly: stylesheet, fixed page header, per-section markup and the
//! single-pass `{{slot}}` filler that puts them into a layout.

use crate::models::template::Column;
use crate::structuring::model::{Education, WorkExperience};

use super::context::{PlacedSection, RenderContext, SectionKind, Styling};
use super::layout::Layout;

/// Identity lives only in the page header, so the document title is generic.
const DOCUMENT_TITLE: &str = "Curriculum Vitae";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Replaces each `{{key}}` found in `template` once. Inserted values are never
/// rescanned, so résumé text that looks like a slot stays literal.
pub fn fill_placeholders(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Whether `template` has a `{{key}}` slot, read with the same trimming as
/// `fill_placeholders` so `{{ key }}` counts.
pub fn has_placeholder(template: &str, key: &str) -> bool {
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return false;
        };
        if after[..end].trim() == key {
            return true;
        }
        rest = &after[end + 2..];
    }
    false
}

/// CSS custom properties plus the fixed A4 page geometry.
pub fn stylesheet(style: &Styling) -> String {
    format!(
        r#"    :root {{
      --primary-color: {primary};
      --secondary-color: {secondary};
      --font-family: {font}, system-ui, sans-serif;
    }}
    @page {{ size: A4; margin: 0; }}
    * {{ box-sizing: border-box; }}
    body {{ font-family: var(--font-family); margin: 0; padding: 0; color: #1f2937; font-size: 10.5pt; line-height: 1.45; }}
    .page {{ width: 210mm; min-height: 297mm; padding: 20mm; margin: 0; }}
    .page-header {{ display: flex; justify-content: space-between; align-items: flex-start; border-bottom: 3px solid var(--primary-color); padding-bottom: 5mm; margin-bottom: 8mm; }}
    .page-header .name {{ margin: 0; font-size: 22pt; color: var(--primary-color); }}
    .page-header .contact {{ margin: 2mm 0 0; color: var(--secondary-color); }}
    .page-header .logo {{ max-height: 18mm; max-width: 50mm; }}
    h2 {{ font-size: 12pt; text-transform: uppercase; letter-spacing: 0.05em; color: var(--primary-color); border-bottom: 1px solid var(--secondary-color); padding-bottom: 1mm; margin: 0 0 3mm; }}
    .entry {{ margin-bottom: 4mm; }}
    .entry-head {{ display: flex; justify-content: space-between; font-weight: 600; }}
    .entry-dates {{ color: var(--secondary-color); font-weight: 400; }}
    .entry-sub {{ font-style: italic; }}
    .entry ul {{ margin: 1mm 0 0; padding-left: 5mm; }}
    .tags {{ list-style: none; padding: 0; margin: 0; }}
    .tags li {{ display: inline-block; margin: 0 2mm 2mm 0; padding: 0.5mm 2mm; border: 1px solid var(--secondary-color); border-radius: 2mm; }}
    .brand-band {{ height: 3mm; background: linear-gradient(90deg, var(--primary-color), var(--secondary-color)); margin-bottom: 6mm; }}"#,
        primary = style.primary_color,
        secondary = style.secondary_color,
        font = style.font_family,
    )
}

/// Identity block and logo. Rendered once per page set, outside any section.
fn page_header(ctx: &RenderContext) -> String {
    let info = &ctx.resume.personal_info;
    let mut identity = String::new();
    if !info.name.is_empty() {
        identity.push_str(&format!("<h1 class=\"name\">{}</h1>", escape(&info.name)));
    }
    let contact: Vec<String> = [&info.email, &info.phone, &info.location]
        .into_iter()
        .filter(|v| !v.is_empty())
        .map(|v| escape(v))
        .collect();
    if !contact.is_empty() {
        identity.push_str(&format!(
            "<p class=\"contact\">{}</p>",
            contact.join(" &middot; ")
        ));
    }

    let logo = ctx
        .style
        .logo_url
        .as_deref()
        .map(|url| format!("<img class=\"logo\" src=\"{}\" alt=\"\">", escape(url)))
        .unwrap_or_default();

    format!("<header class=\"page-header\"><div class=\"identity\">{identity}</div>{logo}</header>")
}

fn render_section(section: &PlacedSection, ctx: &RenderContext) -> Option<String> {
    let resume = ctx.resume;
    let body = match section.kind {
        SectionKind::Header => return Some("<div class=\"brand-band\"></div>".to_string()),
        SectionKind::Footer => {
            return Some("<footer class=\"brand-band\"></footer>".to_string());
        }
        SectionKind::PersonalInfo => return None,
        SectionKind::Summary if resume.summary.is_empty() => return None,
        SectionKind::Summary => format!("<p>{}</p>", escape(&resume.summary)),
        SectionKind::Experience if resume.work_experience.is_empty() => return None,
        SectionKind::Experience => resume.work_experience.iter().map(job).collect(),
        SectionKind::Education if resume.education.is_empty() => return None,
        SectionKind::Education => resume.education.iter().map(school).collect(),
        SectionKind::Skills if resume.skills.is_empty() => return None,
        SectionKind::Skills => format!("<ul class=\"tags\">{}</ul>", list_items(&resume.skills)),
        SectionKind::Certifications if resume.certifications.is_empty() => return None,
        SectionKind::Certifications => format!("<ul>{}</ul>", list_items(&resume.certifications)),
    };

    Some(format!(
        "<section class=\"{}\"><h2>{}</h2>{body}</section>",
        css_class(section.kind),
        escape(&section.title)
    ))
}

fn css_class(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Header => "header",
        SectionKind::PersonalInfo => "personal-info",
        SectionKind::Summary => "summary",
        SectionKind::Experience => "experience",
        SectionKind::Education => "education",
        SectionKind::Skills => "skills",
        SectionKind::Certifications => "certifications",
        SectionKind::Footer => "footer",
    }
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape(item)))
        .collect()
}

fn job(job: &WorkExperience) -> String {
    let duties = if job.responsibilities.is_empty() {
        String::new()
    } else {
        format!("<ul>{}</ul>", list_items(&job.responsibilities))
    };
    format!(
        "<div class=\"entry\"><div class=\"entry-head\"><span class=\"entry-title\">{}</span>\
         <span class=\"entry-dates\">{}</span></div><div class=\"entry-sub\">{}</div>{duties}</div>",
        escape(&job.position),
        escape(&job.dates),
        escape(&job.company)
    )
}

fn school(education: &Education) -> String {
    format!(
        "<div class=\"entry\"><div class=\"entry-head\"><span class=\"entry-title\">{}</span>\
         <span class=\"entry-dates\">{}</span></div><div class=\"entry-sub\">{}</div></div>",
        escape(&education.degree),
        escape(&education.dates),
        escape(&education.institution)
    )
}

/// Fills `layout` with the context. Pure: equal inputs give equal output.
pub fn compose(layout: &Layout, ctx: &RenderContext) -> String {
    let two_column = layout.is_two_column();
    let mut left = String::new();
    let mut main = String::new();

    for section in &ctx.sections {
        let Some(markup) = render_section(section, ctx) else {
            continue;
        };
        if two_column && section.column == Column::Left {
            left.push_str(&markup);
        } else {
            main.push_str(&markup);
        }
    }

    let style = stylesheet(&ctx.style);
    let header = page_header(ctx);

    fill_placeholders(
        &layout.html,
        &[
            ("title", DOCUMENT_TITLE),
            ("style", style.as_str()),
            ("header", header.as_str()),
            ("left", left.as_str()),
            ("main", main.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b>"R&D" 'lead'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#39;lead&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_fill_placeholders_is_single_pass() {
        let out = fill_placeholders(
            "<p>{{main}}</p>{{ left }}{{unknown}}{{",
            &[("main", "{{left}}"), ("left", "L")],
        );
        assert_eq!(out, "<p>{{left}}</p>L{{unknown}}{{");
    }

    #[test]
    fn test_has_placeholder_trims_like_the_filler() {
        assert!(has_placeholder("<aside>{{ left }}</aside>", "left"));
        assert!(has_placeholder("{{style}}{{main}}", "main"));
        assert!(!has_placeholder("{{leftover}} {{ left", "left"));
    }

    #[test]
    fn test_stylesheet_carries_branding_and_a4_geometry() {
        let css = stylesheet(&Styling {
            primary_color: "#111111".to_string(),
            secondary_color: "#222222".to_string(),
            font_family: "Lato".to_string(),
            logo_url: None,
        });
        assert!(css.contains("--primary-color: #111111;"));
        assert!(css.contains("--secondary-color: #222222;"));
        assert!(css.contains("--font-family: Lato, system-ui, sans-serif;"));
        assert!(css.contains("@page { size: A4; margin: 0; }"));
        assert!(css.contains("padding: 20mm"));
    }
}
