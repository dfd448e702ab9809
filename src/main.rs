use std::{future::IntoFuture, process, sync::Arc};

use promptdeck::{
    application::{
        error::AppError,
        listing::ListingService,
        prompts::PromptService,
        query::PromptQueryService,
        repos::{CreatePromptParams, PromptsRepo, PromptsWriteRepo},
    },
    cache::{CacheConfig, ListingCache, RemoteCache},
    config,
    domain::prompts::{NewPrompt, PromptDraft},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        redis::RedisCache,
        telemetry,
    },
};
use promptdeck_api_types::samples::sample_prompts;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(args) => run_seed(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = Arc::new(build_cache(&settings).await);

    let reader: Arc<dyn PromptsRepo> = repositories.clone();
    let writer: Arc<dyn PromptsWriteRepo> = repositories;

    let listing = ListingService::new(PromptQueryService::new(reader.clone()), cache.clone());
    let prompts = PromptService::new(reader, writer, cache.clone());

    let state = ApiState {
        listing: Arc::new(listing),
        prompts: Arc::new(prompts),
        cache,
    };

    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

/// The cache never blocks startup: a bad URL or an unreachable server only
/// leaves the process on its local tier.
async fn build_cache(settings: &config::Settings) -> ListingCache {
    let cache_config = CacheConfig::from(&settings.cache);

    let Some(remote) = open_remote(settings) else {
        return ListingCache::local_only(cache_config);
    };

    let cache = ListingCache::new(cache_config, Some(remote));
    if !cache.probe().await {
        warn!(
            target: "promptdeck::cache",
            "redis is not reachable yet; serving from the local listing cache until it recovers"
        );
    }
    cache
}

fn open_remote(settings: &config::Settings) -> Option<Arc<dyn RemoteCache>> {
    let Some(url) = settings.cache.redis_url.as_deref() else {
        info!(target: "promptdeck::cache", "no redis url configured; using the local listing cache");
        return None;
    };

    match RedisCache::open(url) {
        Ok(remote) => Some(Arc::new(remote)),
        Err(err) => {
            warn!(
                target: "promptdeck::cache",
                error = %err,
                "invalid redis url; using the local listing cache"
            );
            None
        }
    }
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal.notified().await });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => {
            return joined
                .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
                .map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }

    info!("shutdown requested; draining connections");
    shutdown.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => joined
            .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
            .map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(_) => {
            warn!("graceful shutdown window elapsed; closing remaining connections");
            Ok(())
        }
    }
}

async fn run_seed(settings: config::Settings, args: config::SeedArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let existing = repositories
        .count_prompts()
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    if existing > 0 && !args.force {
        info!(
            target: "promptdeck::seed",
            existing,
            "store already holds prompts; pass --force to seed anyway"
        );
        return Ok(());
    }

    let mut samples =
        sample_prompts().map_err(|err| AppError::unexpected(format!("bundled samples: {err}")))?;
    // Insert oldest first so store timestamps keep the catalogue order.
    samples.reverse();

    let total = samples.len();
    for sample in samples {
        let votes = sample.votes;
        let prompt = NewPrompt::validate(PromptDraft {
            title: Some(sample.title),
            description: Some(sample.description),
            content: Some(sample.content),
            category: Some(sample.category),
            tags: Some(sample.tags),
            author: Some(sample.author),
        })
        .map_err(|err| AppError::validation(err.to_string()))?;

        repositories
            .create_prompt(CreatePromptParams { prompt, votes })
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    }

    info!(target: "promptdeck::seed", inserted = total, "seeded sample prompts");

    // A running server may still hold the pre-seed listing in redis.
    if let Some(remote) = open_remote(&settings) {
        ListingCache::new(CacheConfig::from(&settings.cache), Some(remote))
            .invalidate()
            .await;
    }
    Ok(())
}
