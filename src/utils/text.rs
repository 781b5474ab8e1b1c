/// 按字符截断文本，不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 合并连续空白并去掉首尾空白
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 生成用于文件名的短标识
pub fn slugify(text: &str, max_chars: usize) -> String {
    let slug: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(max_chars)
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "research".to_string()
    } else {
        slug.to_string()
    }
}
