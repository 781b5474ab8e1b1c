use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::llm::{LLMClient, LanguageModel};
use crate::tools::{PageFetcher, TavilySearch, WebCrawler, WebSearch};

/// 流水线运行期间共享的只读上下文
#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 检索规划、信息抽取与答案撰写使用的模型
    pub worker_llm: Arc<dyn LanguageModel>,
    /// 主题提炼与草稿评审使用的模型
    pub coordinator_llm: Arc<dyn LanguageModel>,
    /// 网络检索服务
    pub search: Arc<dyn WebSearch>,
    /// 网页抓取服务，未开启全文抓取时为空
    pub fetcher: Option<Arc<dyn PageFetcher>>,
}

impl GeneratorContext {
    /// 按配置创建真实的协作方，配置不完整时在任何阶段开始前失败
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let worker_llm = LLMClient::new(
            &config.llm,
            &config.llm.model_efficient,
            config.target_language,
        )?;
        let coordinator_model = if config.llm.model_powerful.trim().is_empty() {
            &config.llm.model_efficient
        } else {
            &config.llm.model_powerful
        };
        let coordinator_llm =
            LLMClient::new(&config.llm, coordinator_model, config.target_language)?;

        let search = TavilySearch::new(&config.search).context("无法创建检索客户端")?;
        let fetcher: Option<Arc<dyn PageFetcher>> = if config.research.fetch_full_pages {
            let crawler = WebCrawler::new(&config.crawler).context("无法创建网页抓取客户端")?;
            Some(Arc::new(crawler))
        } else {
            None
        };

        tracing::debug!(
            "模型分配: worker={}, coordinator={}",
            worker_llm.model(),
            coordinator_llm.model()
        );

        Ok(Self {
            config,
            worker_llm: Arc::new(worker_llm),
            coordinator_llm: Arc::new(coordinator_llm),
            search: Arc::new(search),
            fetcher,
        })
    }

    /// 使用外部注入的协作方创建上下文，凭据由协作方自行负责
    pub fn with_collaborators(
        config: Config,
        worker_llm: Arc<dyn LanguageModel>,
        coordinator_llm: Arc<dyn LanguageModel>,
        search: Arc<dyn WebSearch>,
    ) -> Result<Self> {
        config.research.validate()?;

        Ok(Self {
            config,
            worker_llm,
            coordinator_llm,
            search,
            fetcher: None,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
}
