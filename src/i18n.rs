use serde::{Deserialize, Serialize};

/// 最终答案使用的语言
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "ru")]
    Russian,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Chinese => write!(f, "zh"),
            TargetLanguage::Japanese => write!(f, "ja"),
            TargetLanguage::Korean => write!(f, "ko"),
            TargetLanguage::German => write!(f, "de"),
            TargetLanguage::French => write!(f, "fr"),
            TargetLanguage::Russian => write!(f, "ru"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" | "英文" => Ok(TargetLanguage::English),
            "zh" | "chinese" | "中文" => Ok(TargetLanguage::Chinese),
            "ja" | "japanese" | "日本語" | "日文" => Ok(TargetLanguage::Japanese),
            "ko" | "korean" | "한국어" | "韩文" => Ok(TargetLanguage::Korean),
            "de" | "german" | "deutsch" | "德文" => Ok(TargetLanguage::German),
            "fr" | "french" | "français" | "法文" => Ok(TargetLanguage::French),
            "ru" | "russian" | "русский" | "俄文" => Ok(TargetLanguage::Russian),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Chinese => "中文",
            TargetLanguage::Japanese => "日本語",
            TargetLanguage::Korean => "한국어",
            TargetLanguage::German => "Deutsch",
            TargetLanguage::French => "Français",
            TargetLanguage::Russian => "Русский",
        }
    }

    /// 获取语言的提示词指令，拼接在模型的系统提示词之后
    pub fn prompt_instruction(&self) -> &'static str {
        match self {
            TargetLanguage::English => {
                "Please write every answer in English, keeping the language accurate, professional and easy to understand."
            }
            TargetLanguage::Chinese => "请使用中文撰写回答，确保语言表达准确、专业、易于理解。",
            TargetLanguage::Japanese => {
                "日本語で回答を作成してください。正確で専門的で理解しやすい言語表現を心がけてください。"
            }
            TargetLanguage::Korean => {
                "한국어로 답변을 작성해 주세요. 정확하고 전문적이며 이해하기 쉬운 언어 표현을 사용해 주세요."
            }
            TargetLanguage::German => {
                "Bitte verfassen Sie alle Antworten auf Deutsch, präzise, professionell und leicht verständlich."
            }
            TargetLanguage::French => {
                "Veuillez rédiger toutes les réponses en français, de manière précise, professionnelle et facile à comprendre."
            }
            TargetLanguage::Russian => {
                "Пожалуйста, пишите все ответы на русском языке, точно, профессионально и понятно."
            }
        }
    }
}
