use regex::Regex;
use lazy_static::lazy_static;
use html_escape::decode_html_entities;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE_SPACES: Regex = Regex::new(r"[ \t\u{00A0}]{2,}").unwrap();
    static ref RE_MANY_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// NFC-compose and trim. Every word and lemma goes through this before it is
/// stored or used as a lookup key.
pub fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().trim().to_string()
}

pub fn normalize_opt(text: Option<&str>) -> String {
    match text {
        Some(t) => normalize(t),
        None => String::new(),
    }
}

/// Strip HTML tags, scripts, styles, comments, and decode entities.
pub fn strip_html(text: &str) -> String {
    lazy_static! {
        static ref RE_DOCTYPE: Regex = Regex::new(r"(?i)<!doctype[^>]*>").unwrap();
        static ref RE_HEAD: Regex = Regex::new(r"(?is)<head(.*?)</head>").unwrap();
        static ref RE_STYLE: Regex = Regex::new(r"(?is)<style(.*?)</style>").unwrap();
        static ref RE_SCRIPT: Regex = Regex::new(r"(?is)<script(.*?)</script>").unwrap();
        static ref RE_COMMENT: Regex = Regex::new(r"(?s)<!--(.*?)-->").unwrap();
        static ref RE_TAG: Regex = Regex::new(r"</*\w[^>]*>").unwrap();
    }
    let mut s = RE_DOCTYPE.replace_all(text, "").to_string();
    s = RE_HEAD.replace_all(&s, "").to_string();
    s = RE_STYLE.replace_all(&s, "").to_string();
    s = RE_SCRIPT.replace_all(&s, "").to_string();
    s = RE_COMMENT.replace_all(&s, "").to_string();
    s = RE_TAG.replace_all(&s, "").to_string();
    // Decode after the tags are gone, so that &lt; in the text doesn't open a tag.
    s = decode_html_entities(&s).to_string();
    s = RE_SPACES.replace_all(&s, " ").to_string();
    s.trim().to_string()
}

/// Convert an HTML definition (e-Sword .dcti) to plain text.
///
/// Block-level closing tags and `<br>` become line breaks, link targets are
/// dropped and only the link text is kept.
pub fn html_to_text(html: &str) -> String {
    lazy_static! {
        static ref RE_BR: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
        static ref RE_BLOCK_END: Regex = Regex::new(r"(?i)</(p|div|li|h[1-6]|tr|blockquote)>").unwrap();
        static ref RE_LI_START: Regex = Regex::new(r"(?i)<li\b[^>]*>").unwrap();
    }

    // Source line breaks are not significant in HTML.
    let mut s = html.replace("\r\n", " ").replace(['\n', '\r'], " ");

    s = RE_BR.replace_all(&s, "\n").to_string();
    s = RE_BLOCK_END.replace_all(&s, "\n").to_string();
    s = RE_LI_START.replace_all(&s, "* ").to_string();

    s = strip_html(&s);
    compact_lines(&s)
}

/// Trim each line, collapse space runs and keep at most one empty line
/// between paragraphs.
pub fn compact_lines(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| RE_SPACES.replace_all(line.trim(), " ").to_string())
        .collect();
    let s = lines.join("\n");
    let s = RE_MANY_NEWLINES.replace_all(&s, "\n\n");
    s.trim().to_string()
}
