use redis::aio::ConnectionManager;
use tokio::time::{timeout, Duration};

/// Connect to Redis if `REDIS_URL` is set. The cache is optional, so callers
/// treat an error here as "run without cache".
pub async fn get_redis() -> anyhow::Result<ConnectionManager> {
    let redis_url = std::env::var("REDIS_URL")
        .map_err(|_| anyhow::anyhow!("REDIS_URL not set"))?;
    let client = redis::Client::open(redis_url)?;

    let manager = timeout(Duration::from_secs(5), ConnectionManager::new(client))
        .await
        .map_err(|_| anyhow::anyhow!("Redis connection timeout after 5 seconds"))??;

    Ok(manager)
}
