// 端到端场景测试：账户创建、令牌签发、邮箱变更与密码重置全流程

use std::sync::Arc;

use chrono::Duration;

use accountkit::{
    AccountFetcher, AccountManager, AccountRecord, EmailChangeManager, EmailChangePayload, Entity,
    Error, MemoryAccountStore, MemoryCache, MemoryProviderLinkStore, MemoryRequestStore,
    PasswordResetManager, PasswordResetPayload, ProviderLinkManager, ProviderLinkRecord,
    RequestRecord, RequestStore, TokenIssuer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn test_full_account_lifecycle() {
    init_tracing();

    let store = Arc::new(MemoryAccountStore::new());
    let cache = Arc::new(MemoryCache::new());
    let accounts = AccountManager::new(store.clone(), cache.clone());
    let fetcher = AccountFetcher::new(cache.clone());

    let email_store = Arc::new(MemoryRequestStore::new());
    let email_requests: EmailChangeManager<_> = EmailChangeManager::new(email_store.clone());

    let reset_store = Arc::new(MemoryRequestStore::new());
    let password_resets: PasswordResetManager<_> = PasswordResetManager::new(reset_store.clone());

    let issuer = TokenIssuer::new(
        "integration-secret",
        "accountkit",
        Duration::hours(1),
        Duration::days(30),
    );

    // 注册账户
    let mut account = AccountRecord::new("Alice", "alice", "alice@example.com");
    account.set_password("first-password").unwrap();
    accounts.create(&account).await.unwrap();

    let cached = fetcher.fetch_by_username("alice").await.unwrap().unwrap();
    assert_eq!(cached, account);

    // 签发并校验令牌
    let access = issuer.issue_access_token(&account).unwrap();
    let refresh = issuer.issue_refresh_token(&account).unwrap();
    let claims = issuer.parse_access_token(&access).unwrap();
    assert_eq!(claims.sub, account.id());
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(issuer.parse_refresh_token(&refresh).unwrap().sub, account.id());

    // 发起邮箱变更请求；存活期间重复发起被拒绝
    let payload = EmailChangePayload::new("alice@example.com", "alice@new.example.com");
    let request = email_requests
        .create_request(account.id(), payload.clone())
        .await
        .unwrap();
    assert!(matches!(
        email_requests
            .create_request(account.id(), payload.clone())
            .await
            .unwrap_err(),
        Error::RequestExists
    ));

    // 模拟过期：换成一条已过期的同负载记录，续期生成全新令牌
    email_store.delete(request.id()).await.unwrap();
    let expired = RequestRecord::new(account.id(), payload, Duration::hours(-1));
    email_store.insert(&expired).await.unwrap();

    let renewed = email_requests.get_or_renew(account.id()).await.unwrap();
    assert_ne!(renewed.token, expired.token);
    assert!(renewed.meta.created_at > expired.meta.created_at);
    let live = email_requests
        .find_request(account.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.meta.id, renewed.meta.id);

    // 错误令牌被拒绝且请求保留
    assert!(matches!(
        email_requests
            .validate_request(account.id(), "guessed-token")
            .await
            .unwrap_err(),
        Error::InvalidToken
    ));

    // 正确令牌消费请求，负载落到账户上
    let consumed = email_requests
        .validate_request(account.id(), &renewed.token)
        .await
        .unwrap();
    account.set_email(&consumed.payload.new_email);
    accounts.update(&mut account).await.unwrap();

    assert!(matches!(
        email_requests
            .validate_request(account.id(), &renewed.token)
            .await
            .unwrap_err(),
        Error::NotFound
    ));

    let refreshed = accounts
        .get_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.email, "alice@new.example.com");

    // 密码重置流程
    let reset = password_resets
        .create_request(account.id(), PasswordResetPayload {})
        .await
        .unwrap();
    password_resets
        .validate_request(account.id(), &reset.token)
        .await
        .unwrap();
    account.set_password("second-password").unwrap();
    accounts.update(&mut account).await.unwrap();

    let current = accounts.seed_by_username("alice").await.unwrap();
    assert!(current.verify_password("second-password").unwrap());
    assert!(!current.verify_password("first-password").unwrap());

    // 令牌无状态：账户变更后旧访问令牌仍可通过校验直至过期
    assert!(issuer.parse_access_token(&access).is_ok());

    // 注销账户
    accounts.delete(&account).await.unwrap();
    assert!(accounts.find_by_id(account.id()).await.unwrap().is_none());
    assert!(fetcher.fetch_by_username("alice").await.unwrap().is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_provider_link_storage_round_trip() {
    init_tracing();

    let store = Arc::new(MemoryProviderLinkStore::new());
    let cache = Arc::new(MemoryCache::new());
    let links = ProviderLinkManager::new("google", store, cache.clone());

    let mut link = ProviderLinkRecord::new("google", "account-1");
    link.subject = "114477".to_string();
    link.email = "alice@gmail.com".to_string();
    link.access_token = "ya29.a0".to_string();
    link.token_type = "Bearer".to_string();
    link.refresh_token = "1//r".to_string();
    link.expires_in = 3600;
    link.scopes = vec!["openid".to_string(), "email".to_string()];
    links.create(&link).await.unwrap();

    let found = links.get_by_owner("account-1").await.unwrap().unwrap();
    assert_eq!(found, link);

    link.access_token = "ya29.a1".to_string();
    links.update(&mut link).await.unwrap();
    let cached = links.get_by_owner("account-1").await.unwrap().unwrap();
    assert_eq!(cached.access_token, "ya29.a1");

    links.delete(&link).await.unwrap();
    assert!(links.get_by_owner("account-1").await.unwrap().is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_store_outlives_cache_failure() {
    init_tracing();

    let store = Arc::new(MemoryAccountStore::new());
    let cache = Arc::new(MemoryCache::new());
    let accounts = AccountManager::new(store.clone(), cache.clone());

    let account = AccountRecord::new("Bob", "bob", "bob@example.com");
    cache.set_write_failures(true);
    assert!(matches!(
        accounts.create(&account).await.unwrap_err(),
        Error::CacheUnavailable(_)
    ));

    // 行已持久化；缓存恢复后 get 回源补种
    cache.set_write_failures(false);
    let got = accounts.get_by_username("bob").await.unwrap().unwrap();
    assert_eq!(got, account);
    assert!(!cache.is_empty().await);
}
