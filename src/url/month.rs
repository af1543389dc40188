/// Derives the zero-padded month encoded in a topic-month index URL
///
/// Topic-month index URLs end in `-<month>.html`, with the month written
/// without padding (`sitemap-2016-1.html`). Query strings and fragments are
/// ignored. Returns None when the trailing segment is not a month number.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::month_from_url;
///
/// assert_eq!(month_from_url("/politics/article/sitemap-2016-1.html"), Some("01".to_string()));
/// assert_eq!(month_from_url("/us/article/sitemap-2022-12.html"), Some("12".to_string()));
/// ```
pub fn month_from_url(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let tail = path.rsplit('-').next()?;
    let digits = tail.strip_suffix(".html").unwrap_or(tail);

    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let month: u32 = digits.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some(format!("{:02}", month))
}
