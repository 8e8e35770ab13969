use regex_lite::Regex;

/// Render one page of an object's text: bold title, then the page's lines
/// trimmed and joined with `<br>`.
pub fn page_html(title: &str, text: &str, links: bool) -> String {
    let body = text
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("<br>");
    let body = if links { linkify(&body) } else { body };
    format!("<strong>{title}</strong><br>{body}")
}

/// Turn bare GitHub URLs into links that open in a new tab.
pub fn linkify(text: &str) -> String {
    let Ok(re) = Regex::new(r"(https://github\.com/[^\s<]+)") else {
        return text.to_string();
    };
    re.replace_all(
        text,
        r#"<a href="$1" target="_blank" style="color: #00CED1; text-decoration: underline; cursor: pointer;">$1</a>"#,
    )
    .into_owned()
}
