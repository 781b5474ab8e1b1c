use crate::config::{Config, DEFAULT_CONFIG_FILE, LLMProvider, SearchDepth};
use crate::i18n::TargetLanguage;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// DeepQuery - 由Rust与AI驱动的多阶段网络调研引擎
#[derive(Parser, Debug)]
#[command(name = "deepquery")]
#[command(
    about = "AI-driven research assistant: turns a question into a researched, drafted, critiqued and refined answer backed by web sources."
)]
#[command(version)]
pub struct Args {
    /// 调研问题，缺省时从标准输入读取
    #[arg(short, long)]
    pub query: Option<String>,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 答案格式 (markdown, plain_text, ...)
    #[arg(short, long)]
    pub format: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，用于检索规划、信息抽取与答案撰写
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于主题提炼与草稿评审
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 单次模型调用超时（秒）
    #[arg(long)]
    pub llm_timeout: Option<u64>,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// Tavily API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 检索深度 (basic, advanced)
    #[arg(long)]
    pub search_depth: Option<String>,

    /// 生成的检索查询数量
    #[arg(long)]
    pub num_queries: Option<usize>,

    /// 每个查询的结果数量
    #[arg(long)]
    pub max_results: Option<usize>,

    /// 并发检索数量上限
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// 抓取网页全文替换检索摘录
    #[arg(long)]
    pub fetch_pages: bool,

    /// 答案语言 (en, zh, ja, ko, de, fr, ru)
    #[arg(long)]
    pub target_language: Option<String>,

    /// 每个阶段完成后保存状态快照
    #[arg(long)]
    pub save_snapshots: bool,
}

impl Args {
    /// 将CLI参数转换为配置，命令行参数优先于配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            Config::from_file(config_path)
                .with_context(|| format!("无法读取配置文件 {}", config_path.display()))?
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_CONFIG_FILE);

            if default_config_path.exists() {
                Config::from_file(&default_config_path).with_context(|| {
                    format!("无法读取默认配置文件 {}", default_config_path.display())
                })?
            } else {
                Config::default()
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }
        if let Some(format) = self.format {
            config.answer_format = format;
        }
        config.verbose |= self.verbose;
        config.persist_snapshots |= self.save_snapshots;

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用 {}",
                    provider_str, config.llm.provider
                ),
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(llm_timeout) = self.llm_timeout {
            config.llm.timeout_seconds = llm_timeout;
        }

        // 覆盖检索配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(depth_str) = self.search_depth {
            match depth_str.parse::<SearchDepth>() {
                Ok(depth) => config.search.search_depth = depth,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的检索深度: {}，使用 {}",
                    depth_str,
                    config.search.search_depth.as_str()
                ),
            }
        }

        // 覆盖调研配置
        if let Some(num_queries) = self.num_queries {
            config.research.num_queries = num_queries;
        }
        if let Some(max_results) = self.max_results {
            config.research.max_results_per_query = max_results;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.research.max_parallels = max_parallels;
        }
        config.research.fetch_full_pages |= self.fetch_pages;

        if let Some(target_language_str) = self.target_language {
            match target_language_str.parse::<TargetLanguage>() {
                Ok(language) => config.target_language = language,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用 {}",
                    target_language_str,
                    config.target_language.display_name()
                ),
            }
        }

        Ok(config)
    }
}

/// 在交互模式下读取调研问题，空输入与`--query ""`一样原样交给流水线
pub fn read_query<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "Enter your research query: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("无法读取调研问题")?;
    Ok(line.trim().to_string())
}
