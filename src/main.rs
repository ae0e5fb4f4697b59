//! Campus Portal Backend
//! Mission: Authenticate university staff and gate portal features by role

use anyhow::{Context, Result};
use campus_portal::{
    access::AccessResolver,
    api::{build_router, RouterOptions},
    auth::{AuthService, JwtHandler, PasswordVerifier, UserStore},
    config::PortalConfig,
    db::DbPool,
    portal::{PortalRepositories, PortalService},
};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use rand::RngCore;
use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "campus-portal")]
#[command(about = "University staff portal: authentication and role-based access")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    Serve(ServeArgs),

    /// Create the demo staff accounts that are missing
    SeedUsers {
        #[command(flatten)]
        config: PortalConfig,
    },

    /// Print a bcrypt hash for a password
    HashPassword {
        password: String,

        #[arg(long, env = "BCRYPT_COST", default_value = "10")]
        cost: u32,
    },

    /// Print a random signing secret (hex)
    GenerateSecret {
        #[arg(long, default_value = "64")]
        bytes: usize,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    config: PortalConfig,

    /// Provision the demo accounts before serving
    #[arg(long)]
    seed_demo_users: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args.config, args.seed_demo_users).await,
        None => serve(PortalConfig::from_env()?, false).await,
        Some(Commands::SeedUsers { config }) => seed_users(config).await,
        Some(Commands::HashPassword { password, cost }) => {
            let hash = bcrypt::hash(password, cost).context("Failed to hash password")?;
            println!("{}", hash);
            Ok(())
        }
        Some(Commands::GenerateSecret { bytes }) => {
            let mut secret = vec![0u8; bytes.max(32)];
            rand::thread_rng().fill_bytes(&mut secret);
            println!("{}", hex::encode(secret));
            Ok(())
        }
    }
}

async fn open_user_store(config: &PortalConfig) -> Result<(DbPool, UserStore)> {
    let db_path = config.database_path()?;
    let pool = DbPool::open(db_path, config.pool_config())
        .with_context(|| format!("Failed to open credential store at {}", db_path))?;
    let users = UserStore::new(pool.clone()).await?;

    info!("📊 Credential store ready at: {}", db_path);
    Ok((pool, users))
}

async fn seed_users(config: PortalConfig) -> Result<()> {
    let (pool, users) = open_user_store(&config).await?;
    let verifier = PasswordVerifier::new(config.bcrypt_cost)?;

    let created = users.seed_demo_users(&verifier).await?;
    let total = users.list_users().await?.len();
    info!(
        "✅ Seeding done, {} account(s) created, {} in store",
        created, total
    );

    pool.close();
    Ok(())
}

async fn serve(config: PortalConfig, seed_demo_users: bool) -> Result<()> {
    config.validate()?;

    info!("🚀 Campus Portal starting");

    let access = AccessResolver::builtin().context("Permission table is incomplete")?;
    let (pool, users) = open_user_store(&config).await?;

    if seed_demo_users {
        let seeder = PasswordVerifier::new(config.bcrypt_cost)?;
        users.seed_demo_users(&seeder).await?;
    }

    // Unknown accounts must cost what stored hashes cost
    let reference_hash = users.sample_password_hash().await?;
    let verifier = Arc::new(PasswordVerifier::calibrated(
        config.bcrypt_cost,
        reference_hash.as_deref(),
    )?);
    if verifier.dummy_cost() != verifier.cost() {
        warn!(
            "⚠️  BCRYPT_COST is {} but stored hashes use cost {}; unknown accounts are checked at {}",
            verifier.cost(),
            verifier.dummy_cost(),
            verifier.dummy_cost()
        );
    }

    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret()?));
    let auth = Arc::new(AuthService::new(users, verifier, jwt_handler));
    let portal = Arc::new(PortalService::new(access, PortalRepositories::demo()));

    info!("🔐 Authentication initialized (token lifetime 24h)");

    match config.cors_origin.as_deref() {
        Some(origin) => info!("🌐 CORS origin: {}", origin),
        None => warn!("⚠️  CORS_ORIGIN not set, cross-origin requests will be refused"),
    }

    if config.trust_forwarded_for {
        info!("🔀 Login rate limit keyed on X-Forwarded-For");
    }

    let (app, limiter) = build_router(
        auth,
        portal,
        RouterOptions {
            cors_origin: config.cors_origin.clone(),
            login_rate_limit: config.login_rate_limit(),
        },
    )?;

    // Forget idle rate-limit entries
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            limiter.cleanup();
        }
    });

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    pool.close();
    info!("👋 Campus Portal stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_portal=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate root when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
