use actix_web::{App, HttpServer, middleware, web};

use alliance::auth::rate_limit::RateLimiter;
use alliance::config::AppConfig;
use alliance::db::{self, Db};
use alliance::models::account;
use alliance::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let db = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url).await.map_err(std::io::Error::other)?;
            db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
            Db::postgres(pool)
        }
        None => {
            log::warn!("No DATABASE_URL set, using the in-memory store (data lost on restart)");
            Db::memory()
        }
    };

    // Bootstrap admin and demo portfolio
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        db::seed_admin(&db, email, password)
            .await
            .map_err(std::io::Error::other)?;
    }
    if config.seed_demo {
        let created_by = match &config.admin_email {
            Some(email) => account::find_by_email(&db, email)
                .await
                .map_err(std::io::Error::other)?
                .map(|a| a.uid),
            None => None,
        };
        db::seed_demo_portfolio(&db, created_by.as_deref().unwrap_or("system"))
            .await
            .map_err(std::io::Error::other)?;
    }

    let secret_key = config.cookie_key();
    let limiter = RateLimiter::new();

    log::info!("Starting server at http://{}", config.bind_addr);

    let cookie_secure = config.cookie_secure;
    HttpServer::new(move || {
        App::new()
            .wrap(routes::session_middleware(secret_key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .configure(routes::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
