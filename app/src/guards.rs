// ticketing_app/src/guards.rs

//! Interceptors shared by processes: login, resource ownership and WeChat
//! authorization checks. Each either continues the chain or stops it with a
//! typed failure.

use crate::rpc::{current_user_id, RpcCall, RpcContext};
use crate::session::{WechatAccessToken, SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN};
use proc_chain::{async_trait, ChainError, ChainResult, Interceptor, Next};
use serde_json::json;
use std::marker::PhantomData;
use tracing::debug;

pub const FAIL_CD_USER_NOT_LOGGED_IN: &str = "USER.USER_NOT_LOGGED_IN";
pub const FAIL_CD_RESOURCE_NOT_BELONG_TO_CURRENT_USER: &str = "USER.RESOURCE_NOT_BELONG_TO_CURRENT_USER";
pub const FAIL_CD_WECHAT_AUTH_REDIRECT: &str = "USER.WECHAT_AUTH_REDIRECT";

const WECHAT_AUTHORIZE_ENDPOINT: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
const WECHAT_AUTH_SCOPE: &str = "snsapi_userinfo";

pub struct EnsureLoggedIn;

#[async_trait]
impl Interceptor<RpcContext> for EnsureLoggedIn {
  async fn handle(&self, call: RpcCall, next: Next<'_, RpcContext>) -> ChainResult {
    if current_user_id(&call)?.is_none() {
      debug!(process = call.process(), "Rejected: not logged in.");
      return Err(ChainError::failure(FAIL_CD_USER_NOT_LOGGED_IN));
    }
    next.run(call).await
  }
}

/// Decides whether the resource a call targets belongs to `user_id`.
#[async_trait]
pub trait ResourceOwnership: Send + Sync {
  async fn belongs_to(&self, call: &RpcCall, user_id: &str) -> Result<bool, ChainError>;
}

/// Fails with `USER.RESOURCE_NOT_BELONG_TO_CURRENT_USER` unless `R` says the
/// target belongs to the logged-in user. Must run after `EnsureLoggedIn`; a
/// missing login here is a wiring fault.
pub struct EnsureResourceOwner<R> {
  ownership: R,
}

impl<R: ResourceOwnership> EnsureResourceOwner<R> {
  pub fn new(ownership: R) -> Self {
    Self { ownership }
  }
}

#[async_trait]
impl<R: ResourceOwnership> Interceptor<RpcContext> for EnsureResourceOwner<R> {
  async fn handle(&self, call: RpcCall, next: Next<'_, RpcContext>) -> ChainResult {
    let user_id = current_user_id(&call)?
      .ok_or_else(|| anyhow::anyhow!("ownership check in '{}' ran without a logged-in user", call.process()))?;
    if !self.ownership.belongs_to(&call, &user_id).await? {
      debug!(process = call.process(), %user_id, "Rejected: resource owned by another user.");
      return Err(ChainError::failure(FAIL_CD_RESOURCE_NOT_BELONG_TO_CURRENT_USER));
    }
    next.run(call).await
  }
}

/// Ownership taken from a user id carried by the parameter itself.
pub struct ParamUserId<P> {
  extract: fn(&P) -> &str,
  _param: PhantomData<fn(&P)>,
}

impl<P> ParamUserId<P> {
  pub fn new(extract: fn(&P) -> &str) -> Self {
    Self {
      extract,
      _param: PhantomData,
    }
  }
}

#[async_trait]
impl<P: Send + Sync + 'static> ResourceOwnership for ParamUserId<P> {
  async fn belongs_to(&self, call: &RpcCall, user_id: &str) -> Result<bool, ChainError> {
    let param = call.param::<P>()?;
    Ok((self.extract)(param) == user_id)
  }
}

/// Requires a WeChat access token in the session. Otherwise fails with
/// `USER.WECHAT_AUTH_REDIRECT` and `{location}` pointing at the authorization
/// page, which sends the visitor back to `redirect_uri`.
pub struct EnsureWechatAuthorized {
  app_id: String,
  redirect_uri: String,
}

impl EnsureWechatAuthorized {
  pub fn new(app_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
    Self {
      app_id: app_id.into(),
      redirect_uri: redirect_uri.into(),
    }
  }

  pub fn authorize_url(&self, state: &str) -> Result<String, ChainError> {
    let mut url = reqwest::Url::parse_with_params(
      WECHAT_AUTHORIZE_ENDPOINT,
      &[
        ("appid", self.app_id.as_str()),
        ("redirect_uri", self.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", WECHAT_AUTH_SCOPE),
        ("state", state),
      ],
    )
    .map_err(anyhow::Error::new)?;
    url.set_fragment(Some("wechat_redirect"));
    Ok(url.to_string())
  }
}

#[async_trait]
impl Interceptor<RpcContext> for EnsureWechatAuthorized {
  async fn handle(&self, call: RpcCall, next: Next<'_, RpcContext>) -> ChainResult {
    let (token, referer) = {
      let ctx = call.ctx().read();
      (
        ctx.session.get::<WechatAccessToken>(SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN),
        ctx.referer.clone(),
      )
    };
    if token.map_err(anyhow::Error::new)?.is_none() {
      let location = self.authorize_url(referer.as_deref().unwrap_or(""))?;
      return Err(ChainError::failure_with_detail(
        FAIL_CD_WECHAT_AUTH_REDIRECT,
        json!({ "location": location }),
      ));
    }
    next.run(call).await
  }
}
