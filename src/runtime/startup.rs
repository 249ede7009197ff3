use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::{self, KvCache};
use crate::config::StaticConfig;
use crate::jobs::{Collaborators, JobRunner, JobSettings};
use crate::search;
use crate::services::{
    BaiduPushNotifier, HttpApiDocSource, JobLogService, RegionLookup, RegionResolver,
    SwaggerResourceImporter, UserInfoService,
};
use crate::storage::{SeaOrmStore, StorageFactory};

pub struct StartupContext {
    pub store: Arc<SeaOrmStore>,
    pub cache: Arc<dyn KvCache>,
    pub runner: JobRunner,
    pub user_info: UserInfoService,
}

/// 安装 rustls 默认加密实现（Redis TLS 与 HTTPS 共用）
fn install_crypto_provider() {
    // 重复安装返回 Err，可以忽略
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// 只连接数据库并执行迁移
pub async fn prepare_storage(config: &StaticConfig) -> Result<Arc<SeaOrmStore>> {
    StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")
}

/// 创建全部协作方并组装任务执行器
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider();

    let store = prepare_storage(config).await?;
    info!("Using storage backend: {}", store.backend_name());

    let cache = cache::create_cache(&config.cache).context("Failed to create cache client")?;
    let search_index =
        search::create_search_index(&config.search).context("Failed to create search index")?;
    let seo = BaiduPushNotifier::new(&config.seo).context("Failed to create SEO notifier")?;
    let api_docs =
        HttpApiDocSource::new(&config.resources).context("Failed to create API docs source")?;

    let regions = RegionResolver::new(&config.geoip);
    info!("Region lookup: {}", regions.name());

    let importer = SwaggerResourceImporter::new(Arc::new(api_docs), store.clone());
    let job_logs = Arc::new(JobLogService::new(store.clone(), &config.job_log));

    let collaborators = Collaborators {
        cache: cache.clone(),
        visitors: store.clone(),
        articles: store.clone(),
        resources: store.clone(),
        search: search_index,
        seo: Arc::new(seo),
        regions: Arc::new(regions),
        importer: Arc::new(importer),
        job_logs,
    };
    let runner = JobRunner::new(collaborators, JobSettings::from_config(config));
    let user_info = UserInfoService::new(
        store.clone(),
        cache.clone(),
        &config.cache.keys.user_code_prefix,
    );

    debug!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(StartupContext {
        store,
        cache,
        runner,
        user_info,
    })
}
