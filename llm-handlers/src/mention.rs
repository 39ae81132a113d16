//! Pure functions for @-mention detection and stripping.
//!
//! Telegram usernames are case-insensitive, so matching ignores ASCII case.

/// Returns true if `text` contains `@bot_username` in any letter case.
pub fn is_bot_mentioned(text: &str, bot_username: &str) -> bool {
    find_mentions(text, bot_username).next().is_some()
}

/// Removes every `@bot_username` (any letter case) from `text` and trims the result.
pub fn strip_mention(text: &str, bot_username: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in find_mentions(text, bot_username) {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    out.trim().to_string()
}

/// Text addressed to a command handler (`/start`, `/clearhistory@bot`, ...).
pub fn is_command(text: &str) -> bool {
    text.starts_with('/')
}

/// Byte ranges of each mention. Usernames are ASCII, so ASCII case folding keeps
/// offsets valid for the original text.
fn find_mentions<'a>(
    text: &'a str,
    bot_username: &'a str,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let needle = format!("@{}", bot_username.trim_start_matches('@')).to_ascii_lowercase();
    let haystack = text.to_ascii_lowercase();
    let len = needle.len();
    let mut from = 0;
    std::iter::from_fn(move || {
        if len <= 1 {
            return None;
        }
        let start = from + haystack.get(from..)?.find(&needle)?;
        from = start + len;
        Some((start, start + len))
    })
}
