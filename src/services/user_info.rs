//! 用户资料服务
//!
//! Web 层与登录态不在本 crate 内，调用方显式传入当前用户的资料 ID。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::KvCache;
use crate::errors::{BlogkeeperError, Result};
use crate::storage::{UserInfoPatch, UserInfoRecord, UserStore};

/// 对外返回的用户资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoDto {
    pub id: i32,
    pub email: Option<String>,
    pub nickname: String,
    pub avatar: String,
    pub intro: Option<String>,
    pub website: Option<String>,
    pub is_subscribe: bool,
    pub is_disable: bool,
    pub role_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoUpdate {
    pub nickname: String,
    pub intro: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailBinding {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeUpdate {
    pub email: Option<String>,
    pub is_subscribe: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleUpdate {
    pub user_info_id: i32,
    pub nickname: String,
    pub role_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDisableUpdate {
    pub id: i32,
    pub is_disable: bool,
}

pub struct UserInfoService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn KvCache>,
    /// 邮箱验证码键前缀，完整键为 `{prefix}{email}`
    code_prefix: String,
}

impl UserInfoService {
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn KvCache>, code_prefix: &str) -> Self {
        Self {
            store,
            cache,
            code_prefix: code_prefix.to_string(),
        }
    }

    async fn require_user(&self, id: i32) -> Result<UserInfoRecord> {
        self.store
            .find_user_info(id)
            .await?
            .ok_or_else(|| BlogkeeperError::not_found(format!("user info {} not found", id)))
    }

    async fn apply(&self, id: i32, patch: &UserInfoPatch) -> Result<()> {
        if self.store.update_user_info(id, patch).await? {
            Ok(())
        } else {
            Err(BlogkeeperError::not_found(format!(
                "user info {} not found",
                id
            )))
        }
    }

    pub async fn get_user_info_by_id(&self, id: i32) -> Result<UserInfoDto> {
        let user = self.require_user(id).await?;
        let role_ids = self.store.user_role_ids(id).await?;
        Ok(UserInfoDto {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            avatar: user.avatar,
            intro: user.intro,
            website: user.website,
            is_subscribe: user.is_subscribe,
            is_disable: user.is_disable,
            role_ids,
        })
    }

    pub async fn update_user_info(&self, user_info_id: i32, update: UserInfoUpdate) -> Result<()> {
        let patch = UserInfoPatch {
            nickname: Some(validate_nickname(&update.nickname)?),
            intro: update.intro,
            website: update.website,
            ..UserInfoPatch::default()
        };
        self.apply(user_info_id, &patch).await
    }

    /// 校验验证码后绑定邮箱，成功后删除验证码
    pub async fn save_user_email(&self, user_info_id: i32, binding: EmailBinding) -> Result<()> {
        let email = validate_email(&binding.email)?;
        let code_key = format!("{}{}", self.code_prefix, email);

        match self.cache.get_string(&code_key).await? {
            Some(code) if code == binding.code.trim() => {}
            _ => return Err(BlogkeeperError::validation("验证码错误")),
        }

        let patch = UserInfoPatch {
            email: Some(email.clone()),
            ..UserInfoPatch::default()
        };
        self.apply(user_info_id, &patch).await?;
        self.cache.delete(&code_key).await?;

        info!("User {} bound email {}", user_info_id, email);
        Ok(())
    }

    /// 订阅需要邮箱：已绑定或随请求提供
    pub async fn update_user_subscribe(
        &self,
        user_info_id: i32,
        update: SubscribeUpdate,
    ) -> Result<()> {
        let user = self.require_user(user_info_id).await?;
        let supplied = update.email.as_deref().map(validate_email).transpose()?;

        if update.is_subscribe && supplied.is_none() && user.email.is_none() {
            return Err(BlogkeeperError::validation("邮箱未绑定"));
        }

        let patch = UserInfoPatch {
            email: supplied,
            is_subscribe: Some(update.is_subscribe),
            ..UserInfoPatch::default()
        };
        self.apply(user_info_id, &patch).await
    }

    /// 修改昵称并整体替换角色
    pub async fn update_user_role(&self, update: UserRoleUpdate) -> Result<()> {
        let patch = UserInfoPatch {
            nickname: Some(validate_nickname(&update.nickname)?),
            ..UserInfoPatch::default()
        };
        self.apply(update.user_info_id, &patch).await?;

        let mut role_ids = update.role_ids;
        role_ids.sort_unstable();
        role_ids.dedup();
        self.store
            .replace_user_roles(update.user_info_id, &role_ids)
            .await?;

        info!(
            "User {} roles replaced with {:?}",
            update.user_info_id, role_ids
        );
        Ok(())
    }

    pub async fn update_user_disable(&self, update: UserDisableUpdate) -> Result<()> {
        let patch = UserInfoPatch {
            is_disable: Some(update.is_disable),
            ..UserInfoPatch::default()
        };
        self.apply(update.id, &patch).await?;
        info!("User {} disable = {}", update.id, update.is_disable);
        Ok(())
    }
}

fn validate_nickname(nickname: &str) -> Result<String> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(BlogkeeperError::validation("昵称不能为空"));
    }
    Ok(nickname.to_string())
}

/// 只做基本形状校验：`local@domain.tld`
fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if valid {
        Ok(email.to_string())
    } else {
        Err(BlogkeeperError::validation(format!(
            "邮箱格式不正确: {}",
            email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.com ").unwrap(), "a@b.com");
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@@b.com").is_err());
        assert!(validate_email("plain").is_err());
    }

    #[test]
    fn test_validate_nickname() {
        assert_eq!(validate_nickname("  bob ").unwrap(), "bob");
        assert!(validate_nickname("   ").is_err());
    }
}
