/// 账户缓存键前缀
const ACCOUNT_PREFIX: &str = "account:";

/// 生成账户缓存键
pub fn account_key(key: &str) -> String {
    format!("{}{}", ACCOUNT_PREFIX, key)
}

/// 生成外部身份关联缓存键，以提供方名作为命名空间
pub fn provider_link_key(provider: &str, key: &str) -> String {
    format!("{}:{}", provider, key)
}
