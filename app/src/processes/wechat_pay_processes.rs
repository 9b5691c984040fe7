// ticketing_app/src/processes/wechat_pay_processes.rs

use crate::payment::jsapi;
use crate::processes::ProcessDeps;
use crate::rpc::{RpcCall, RpcRegistry};

use proc_chain::terminal;
use serde::Deserialize;

pub const PROC_GET_WECHAT_PAY_JSSDK_CONFIG: &str = "wechat_pay.get_wechat_pay_jssdk_config";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetWechatPayJssdkConfigParam {
  pub prepay_id: String,
}

pub fn register(registry: &RpcRegistry, deps: &ProcessDeps) {
  let credentials = deps.credentials.clone();
  registry.register::<GetWechatPayJssdkConfigParam>(
    PROC_GET_WECHAT_PAY_JSSDK_CONFIG,
    vec![terminal(move |call: RpcCall| {
      let credentials = credentials.clone();
      async move {
        let param = call.param::<GetWechatPayJssdkConfigParam>()?;
        let config = jsapi::jsapi_config(&credentials, &param.prepay_id);
        Ok(serde_json::to_value(config)?)
      }
    })],
  );
}
