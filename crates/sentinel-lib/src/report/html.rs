//! HTML report rendering
//!
//! Pure function of the report data model, producing a self-contained
//! document with inline styling suitable for email clients.

use super::{Report, ReportSection};
use std::fmt::Write;

/// Render the full report document
pub fn render(report: &Report) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"
    <div style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; color: #333; max-width: 800px; margin: auto; border: 1px solid #e0e0e0; border-radius: 10px; box-shadow: 0 4px 8px rgba(0,0,0,0.1);">
        <div style="background-color: #0078D4; color: white; padding: 25px; text-align: center; border-top-left-radius: 10px; border-top-right-radius: 10px;">
            <h1 style="margin: 0; font-size: 28px;">🛡️ Azure FinOps Sentinel Report</h1>
            <p style="margin: 8px 0 0; font-size: 14px;">{}</p>
        </div>
        <div style="padding: 30px;">
            <div style="background-color: #fff4e5; border-left: 5px solid #ff9800; padding: 20px; margin-bottom: 30px; border-radius: 5px;">
                <h2 style="margin-top: 0; font-size: 20px; color: #c05f00;">🚨 Summary: {} Potential Issues Found</h2>
                <p style="margin-bottom: 0;">The automated scan has detected and tagged the following resources for your review. No resources have been deleted.</p>
            </div>
"#,
        report.generated_at.format("%B %d, %Y at %H:%M UTC"),
        report.total(),
    );

    for section in &report.sections {
        render_section(&mut body, section);
    }

    body.push_str(
        r#"
        </div>
        <div style="background-color: #f8f9fa; color: #888; padding: 20px; text-align: center; font-size: 12px; border-bottom-left-radius: 10px; border-bottom-right-radius: 10px;">
            <p style="margin: 0;">This is an automated report from Azure FinOps Sentinel.</p>
        </div>
    </div>
"#,
    );

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>FinOps Report</title>
<style>
    .resource-table {{
        border-collapse: collapse;
        width: 100%;
        margin-top: 15px;
        font-size: 14px;
        box-shadow: 0 2px 5px rgba(0, 0, 0, 0.1);
    }}
    .resource-table thead tr {{
        background-color: #005a9e;
        color: #ffffff;
        text-align: left;
    }}
    .resource-table th, .resource-table td {{
        padding: 12px 15px;
        border-bottom: 1px solid #dddddd;
    }}
    .resource-table tbody tr:nth-of-type(even) {{
        background-color: #f3f3f3;
    }}
    .resource-table tbody tr:hover {{
        background-color: #e8f4fd;
    }}
</style>
</head>
<body style='background-color: #f4f4f4; padding: 20px;'>
    {}
</body>
</html>
"#,
        body
    )
}

fn render_section(out: &mut String, section: &ReportSection) {
    let category = section.category;
    let _ = write!(
        out,
        r#"<h2 style="font-size: 18px; border-bottom: 2px solid #0078D4; padding-bottom: 5px; margin-top: 30px;">{} {} ({})</h2>"#,
        category.icon(),
        category.title(),
        section.findings.len(),
    );

    if section.findings.is_empty() {
        out.push_str(r#"<p style="color: #4CAF50;">✅ No issues found in this category.</p>"#);
    } else {
        out.push_str(r#"<table class="resource-table"><thead><tr>"#);
        for column in category.columns() {
            let _ = write!(out, "<th>{}</th>", column);
        }
        out.push_str("</tr></thead><tbody>");

        for finding in &section.findings {
            out.push_str("<tr>");
            let _ = write!(
                out,
                "<td>{}</td><td>{}</td>",
                escape(&finding.name),
                escape(&finding.resource_group)
            );
            if let Some(avg_cpu) = &finding.avg_cpu {
                let _ = write!(out, "<td>{}</td>", escape(avg_cpu));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }

    out.push_str("<hr style='border: none; border-top: 1px solid #eee; margin: 20px 0;'>");
}

/// Minimal HTML escaping for resource-supplied text
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
