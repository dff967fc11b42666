use regex::Regex;
use std::sync::LazyLock;

// Applied top to bottom. Code blocks have to be rewritten before the
// paragraph rule and the catch-all stripper get a chance to eat them.
static TAG_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"<pre[^>]*>\s*<code[^>]*>", "```\n"),
        (r"</code>\s*</pre>", "\n```"),
        (r"<pre[^>]*>", "```\n"),
        (r"</pre>", "\n```"),
        (r"<h1[^>]*>", "# "),
        (r"<h2[^>]*>", "## "),
        (r"<h3[^>]*>", "### "),
        (r"</h[1-6]>", "\n"),
        (r"<p(\s[^>]*)?>", "\n"),
        (r"</p>", "\n"),
        (r"<br[^>]*>", "\n"),
        (r"<li[^>]*>", " - "),
        (r"</li>", "\n"),
        (r"<code[^>]*>", "`"),
        (r"</code>", "`"),
        (r"<(b|strong)(\s[^>]*)?>", "**"),
        (r"</(b|strong)>", "**"),
        (r"<(em|i)(\s[^>]*)?>", "*"),
        (r"</(em|i)>", "*"),
        (r"<sup[^>]*>", "^"),
        (r"<[^>]*>", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

// `&amp;` goes last so that `&amp;lt;` comes out as `&lt;`.
const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Lossy HTML to Markdown conversion for problem statements.
pub fn render_html(html: &str) -> String {
    let mut text = html.to_string();
    for (pattern, replacement) in TAG_RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    decode_entities(&text)
}

pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}

/// Plain text of an HTML fragment, markup dropped.
pub fn strip_tags(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    fragment.root_element().text().collect::<String>()
}
