//! The HTML shell served to the browser-side viewer.
//!
//! One template covers every document kind. The page embeds the document
//! parameters as a JSON block the client script reads on start-up; every
//! other value is HTML-escaped into attributes.

use serde_json::json;

/// Parameters of one viewer page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewerTemplate {
    pub file_url: String,
    /// MIME type of the document.
    pub file_type: String,
    pub file_extension: String,
    /// Allow-list the client re-checks before showing the document.
    pub supported_types: Vec<String>,
    /// Account the viewer runs under, forwarded to client requests.
    pub account_id: String,
}

/// Render the viewer page for `template`.
pub fn render_viewer_html(template: &ViewerTemplate) -> String {
    let config = json!({
        "fileUrl": template.file_url,
        "fileType": template.file_type,
        "fileExtension": template.file_extension,
        "supportedTypes": template.supported_types,
        "accountId": template.account_id,
    });
    let url = escape_html(&template.file_url);
    let config = escape_script(&config.to_string());

    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Bill viewer</title>\n</head>\n<body>\n");
    html.push_str("<div id=\"viewer\">\n");
    html.push_str("<div id=\"errorMessage\" class=\"error-message\" hidden></div>\n");
    html.push_str("<div id=\"nav\">\n");
    for (id, title) in [
        ("first_page", "First Page"),
        ("prev_page", "Previous Page"),
        ("next_page", "Next Page"),
        ("last_page", "Last Page"),
        ("zoom_in", "Zoom In"),
        ("zoom_out", "Zoom Out"),
        ("reset_zoom", "Reset Zoom"),
    ] {
        html.push_str(&format!("<button type=\"button\" id=\"{id}\" title=\"{title}\"></button>\n"));
    }
    html.push_str("<span id=\"page_num\"></span> / <span id=\"page_count\"></span>\n");
    html.push_str(&format!(
        "<a id=\"download\" href=\"{url}\" download=\"document\">Download</a>\n"
    ));
    html.push_str("</div>\n");
    html.push_str("<div id=\"pdfWrapper\" hidden>\n<canvas id=\"pdfCanvas\"></canvas>\n");
    html.push_str("<div id=\"selectionBox\"></div>\n<div id=\"hoverBox\" hidden></div>\n</div>\n");
    html.push_str("<img id=\"imageViewer\" alt=\"\" hidden>\n");
    html.push_str("<pre id=\"fileContent\" hidden></pre>\n");
    html.push_str(&format!(
        "<div id=\"unsupportedMessage\" hidden>This file type cannot be previewed. \
         <a href=\"{url}\" download=\"document\">Download File</a></div>\n"
    ));
    html.push_str("<input type=\"search\" id=\"searchInput\" placeholder=\"Search\">\n");
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<script type=\"application/json\" id=\"viewerConfig\">{config}</script>\n"
    ));
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep embedded JSON from closing its `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
