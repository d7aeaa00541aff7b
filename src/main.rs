use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::Logger,
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    constants::StoreBackend,
    modules::{
        friend::{
            lifecycle::{FriendRequestLifecycle, FriendsConfig},
            query::FriendRelationshipQuery,
            repository::FriendRequestStore,
            repository_memory::FriendRequestRepositoryMemory,
            repository_pg::FriendRequestRepositoryPg,
            service::FriendService,
        },
        user::{
            cache::CachedUserDirectory, repository::UserRepository,
            repository_pg::UserRepositoryPg,
        },
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let backend = ENV.friend_store_backend;
    if let Err(e) = tracing_subscriber::fmt().with_target(false).try_init() {
        log::debug!("tracing subscriber init: {e}");
    }

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let users: Arc<dyn UserRepository> = match ENV.redis_url.as_deref() {
        Some(url) => {
            let cache = RedisCache::new(url)
                .await
                .map_err(|_| std::io::Error::other("Redis connection error"))?;
            Arc::new(CachedUserDirectory::with_dependencies(
                user_repo,
                Arc::new(cache),
                ENV.user_cache_ttl,
            ))
        }
        None => user_repo,
    };

    let friend_store: Arc<dyn FriendRequestStore> = match backend {
        StoreBackend::Postgres => Arc::new(FriendRequestRepositoryPg::new(db_pool.clone())),
        StoreBackend::Memory => {
            log::warn!("Friend requests are kept in memory and will not survive a restart");
            Arc::new(FriendRequestRepositoryMemory::new())
        }
    };

    let config = FriendsConfig { resend_policy: ENV.friend_resend_policy };
    log::info!("Friend store backend: {backend:?}, resend policy: {:?}", config.resend_policy);

    let lifecycle =
        FriendRequestLifecycle::with_dependencies(friend_store.clone(), users.clone(), config);
    let query = FriendRelationshipQuery::with_dependencies(friend_store.clone(), users.clone());
    let friend_service = FriendService::with_dependencies(lifecycle, query, friend_store, users);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(friend_service.clone()))
            .service(health_check)
            .service(web::scope("/api").configure(modules::friend::route::configure_api))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
