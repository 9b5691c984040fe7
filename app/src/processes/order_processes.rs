// ticketing_app/src/processes/order_processes.rs

use crate::guards::{EnsureLoggedIn, EnsureResourceOwner, ParamUserId, ResourceOwnership};
use crate::orders::{OrderError, OrderManager, DEFAULT_PAGE_SIZE};
use crate::processes::ProcessDeps;
use crate::rpc::{RpcCall, RpcContext, RpcRegistry};
use crate::session::{WechatAccessToken, SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN};

use proc_chain::{async_trait, terminal, ChainError, SharedInterceptor};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub const PROC_GET: &str = "order.get";
pub const PROC_GET_ALL_ORDERS_BY_USER_ID: &str = "order.get_all_orders_by_user_id";
pub const PROC_PAY_BY_WECHAT_H5: &str = "order.pay_by_wechat_h5";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetParam {
  pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetAllOrdersByUserIdParam {
  pub last_id: Option<String>,
  pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayByWechatH5Param {
  pub order_id: String,
}

/// Unparseable ids cannot name an order.
fn parse_order_id(raw: &str) -> Result<Uuid, ChainError> {
  Uuid::parse_str(raw).map_err(|_| OrderError::NoSuchOrder.into())
}

fn list_owner(param: &GetAllOrdersByUserIdParam) -> &str {
  &param.user_id
}

/// The order named by `GetParam::id` belongs to the user. Unknown orders pass
/// so that the handler reports them as missing.
struct OrderOwnership {
  orders: Arc<OrderManager>,
}

#[async_trait]
impl ResourceOwnership for OrderOwnership {
  async fn belongs_to(&self, call: &RpcCall, user_id: &str) -> Result<bool, ChainError> {
    let Ok(id) = Uuid::parse_str(&call.param::<GetParam>()?.id) else {
      return Ok(true);
    };
    Ok(match self.orders.get(id).await? {
      Some(order) => order.user_id == user_id,
      None => true,
    })
  }
}

pub fn register(registry: &RpcRegistry, deps: &ProcessDeps) {
  let logged_in: SharedInterceptor<RpcContext> = Arc::new(EnsureLoggedIn);

  let orders = deps.orders.clone();
  registry.register::<GetParam>(
    PROC_GET,
    vec![
      logged_in.clone(),
      Arc::new(EnsureResourceOwner::new(OrderOwnership {
        orders: deps.orders.clone(),
      })),
      terminal(move |call: RpcCall| {
        let orders = orders.clone();
        async move {
          let id = parse_order_id(&call.param::<GetParam>()?.id)?;
          let order = orders.get(id).await?.ok_or(OrderError::NoSuchOrder)?;
          Ok(serde_json::to_value(order)?)
        }
      }),
    ],
  );

  let orders = deps.orders.clone();
  registry.register::<GetAllOrdersByUserIdParam>(
    PROC_GET_ALL_ORDERS_BY_USER_ID,
    vec![
      deps.wechat_authorized(),
      logged_in.clone(),
      Arc::new(EnsureResourceOwner::new(ParamUserId::new(list_owner))),
      terminal(move |call: RpcCall| {
        let orders = orders.clone();
        async move {
          let param = call.param::<GetAllOrdersByUserIdParam>()?;
          let last_id = param.last_id.as_deref().map(parse_order_id).transpose()?;
          let found = orders.list_by_user(&param.user_id, last_id, DEFAULT_PAGE_SIZE).await?;
          Ok(serde_json::to_value(found)?)
        }
      }),
    ],
  );

  let orders = deps.orders.clone();
  let notify_url = deps.notify_url.clone();
  registry.register::<PayByWechatH5Param>(
    PROC_PAY_BY_WECHAT_H5,
    vec![
      deps.wechat_authorized(),
      logged_in,
      terminal(move |call: RpcCall| {
        let orders = orders.clone();
        let notify_url = notify_url.clone();
        async move {
          let order_id = parse_order_id(&call.param::<PayByWechatH5Param>()?.order_id)?;
          let (token, client_ip) = {
            let ctx = call.ctx().read();
            (
              ctx.session.get::<WechatAccessToken>(SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN),
              ctx.client_ip.clone(),
            )
          };
          let token = token
            .map_err(anyhow::Error::new)?
            .ok_or_else(|| anyhow::anyhow!("payment requested without WeChat authorization"))?;

          let prepay_id = orders
            .initiate_payment(order_id, &client_ip, &notify_url, &token.open_id)
            .await?;
          Ok(json!(prepay_id))
        }
      }),
    ],
  );
}
