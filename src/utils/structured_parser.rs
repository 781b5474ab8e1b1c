//! 结构化抽取解析器 - 把模型的自由文本转换为目标结构
//!
//! 解析失败时逐级降级为更简单的表示，错误只记录日志，从不向调用方返回。

use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Map, Value};

use crate::types::ExtractedFindings;

/// 可以从模型自由文本中恢复的目标结构
pub trait FromModelText: Sized {
    fn from_model_text(text: &str) -> Self;
}

impl FromModelText for Vec<String> {
    fn from_model_text(text: &str) -> Self {
        parse_string_list(text)
    }
}

impl FromModelText for ExtractedFindings {
    fn from_model_text(text: &str) -> Self {
        parse_findings(text)
    }
}

/// 按目标结构解析模型输出
pub fn extract<T: FromModelText>(text: &str) -> T {
    T::from_model_text(text)
}

/// 解析字符串列表
///
/// 优先解析第一个`[`到最后一个`]`之间的列表字面量，失败时退化为逐行拆分并去掉首尾引号。
pub fn parse_string_list(text: &str) -> Vec<String> {
    if let Some(span) = delimited_span(text, '[', ']') {
        match parse_list_literal(span) {
            Some(items) => return items,
            None => tracing::warn!("列表字面量解析失败，退化为逐行拆分: {}", span),
        }
    }

    content_lines(text)
        .map(|line| line.trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 解析四类结构化发现
///
/// 优先解析第一个`{`到最后一个`}`之间的JSON对象，缺失字段视为空序列；
/// 失败时把每个非空行作为一条主要发现，代码块围栏行（以三个反引号开头）不计入。
pub fn parse_findings(text: &str) -> ExtractedFindings {
    if let Some(span) = delimited_span(text, '{', '}') {
        let cleaned = span.replace("```json", "").replace("```", "");
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(Value::Object(fields)) => return findings_from_object(&fields),
            Ok(other) => tracing::warn!("结构化发现不是JSON对象，退化为逐行拆分: {}", other),
            Err(e) => tracing::warn!("结构化发现JSON解析失败，退化为逐行拆分: {}", e),
        }
    }

    ExtractedFindings {
        main_findings: content_lines(text).map(str::to_string).collect(),
        ..Default::default()
    }
}

fn findings_from_object(fields: &Map<String, Value>) -> ExtractedFindings {
    ExtractedFindings {
        main_findings: lenient_strings(fields.get("main_findings")),
        data_points: lenient_strings(fields.get("data_points")),
        perspectives: lenient_strings(fields.get("perspectives")),
        information_gaps: lenient_strings(fields.get("information_gaps")),
    }
}

/// 宽松地把任意JSON值转换为字符串序列
fn lenient_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}

/// 截取第一个开括号到最后一个闭括号（含）之间的内容
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..end + close.len_utf8()])
}

/// 非空行，跳过代码块围栏
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
}

/// 解析仅包含带引号字符串的列表字面量，兼容单引号、双引号与结尾逗号
fn parse_list_literal(span: &str) -> Option<Vec<String>> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(span) {
        return Some(items);
    }

    let mut chars = span.chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.next()? {
            ']' => break,
            quote @ ('"' | '\'') => {
                items.push(read_quoted(&mut chars, quote)?);
                skip_whitespace(&mut chars);
                match chars.next()? {
                    ',' => continue,
                    ']' => break,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }

    skip_whitespace(&mut chars);
    if chars.next().is_some() {
        return None;
    }
    Some(items)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                escaped => value.push(escaped),
            },
            c if c == quote => return Some(value),
            c => value.push(c),
        }
    }
    None
}
