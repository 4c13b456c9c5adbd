use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;

use crate::{config::Config, utils::failure_to_api_response};

/// 基于 Redis 的固定窗口限流，每个客户端 IP 一个计数器
#[derive(Clone)]
pub struct RateLimiter {
    redis: redis::Client,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: Arc<Config>) -> Self {
        Self { redis, config }
    }

    /// 计数并返回当前窗口内的请求数
    async fn hit(&self, ip: &str) -> redis::RedisResult<u64> {
        let key = format!("rate_limit:{ip}");
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        // INCR + EXPIRE 实现计数器，第一次请求时设置过期时间
        let count: u64 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn
                .expire(&key, self.config.rate_limit_window().as_secs() as i64)
                .await?;
        }
        Ok(count)
    }

    pub async fn check_rate_limit(&self, req: Request<Body>, next: Next) -> Response {
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());
        let ip = client_ip(req.headers(), remote_ip.as_deref());

        match self.hit(&ip).await {
            Ok(count) if count > u64::from(self.config.rate_limit_requests) => {
                tracing::info!(%ip, count, "Rate limit exceeded");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    failure_to_api_response(format!(
                        "Too many requests, please try again in {} seconds",
                        self.config.rate_limit_window().as_secs()
                    )),
                )
                    .into_response()
            }
            Ok(_) => next.run(req).await,
            Err(e) => {
                // Redis 不可用时放行
                tracing::warn!(%ip, "Rate limiter unavailable: {}", e);
                next.run(req).await
            }
        }
    }
}

/// 优先 x-real-ip，其次 x-forwarded-for 的第一个非空地址，最后是连接地址
pub fn client_ip(headers: &HeaderMap, remote_ip: Option<&str>) -> String {
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').map(str::trim).find(|ip| !ip.is_empty()))
        })
        .or(remote_ip)
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some("10.0.0.1")), "10.0.0.1");
        assert_eq!(client_ip(&headers, None), "unknown");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" , 203.0.113.7, 10.0.0.2"),
        );
        assert_eq!(client_ip(&headers, Some("10.0.0.1")), "203.0.113.7");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers, Some("10.0.0.1")), "198.51.100.4");
    }
}
