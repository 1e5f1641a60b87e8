#![forbid(unsafe_code)]

use crate::{
    INVALID_PARAMS, JsonRpcRequest, METHOD_NOT_FOUND, McpServer, SERVER_NOT_INITIALIZED,
    ServerConfig, ToolReply, json_rpc_error, json_rpc_response,
};
use growth_storage::{CampaignStore, GrowthStore};
use serde_json::{Value, json};

impl McpServer {
    pub(crate) fn new(cfg: &ServerConfig) -> Self {
        Self {
            initialized: false,
            growth: GrowthStore::open(&cfg.growth_repo),
            campaign: CampaignStore::open(&cfg.campaign_repo),
        }
    }

    pub(crate) fn growth(&self) -> &GrowthStore {
        &self.growth
    }

    pub(crate) fn campaign(&self) -> &CampaignStore {
        &self.campaign
    }

    pub(crate) fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();
        let expects_response = request.expects_response();
        log::debug!("request: method={method} id={:?}", request.id);

        if method == "initialize" {
            let protocol_version = request
                .params
                .as_ref()
                .and_then(|v| v.get("protocolVersion"))
                .and_then(|v| v.as_str())
                .unwrap_or(crate::MCP_VERSION);

            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": protocol_version,
                    "serverInfo": {
                        "name": crate::SERVER_NAME,
                        "version": crate::SERVER_VERSION
                    },
                    "capabilities": {
                        "tools": {},
                        "resources": {},
                        "prompts": {},
                        "logging": {}
                    }
                }),
            ));
        }

        // `initialized` without the namespace still shows up from older clients; never answered.
        if method == "notifications/initialized" || method == "initialized" {
            self.initialized = true;
            return None;
        }

        if !self.initialized {
            if matches!(
                method,
                "tools/call"
                    | "tools/list"
                    | "resources/list"
                    | "resources/read"
                    | "resources/templates/list"
                    | "ping"
            ) {
                self.initialized = true;
            } else if expects_response {
                return Some(json_rpc_error(
                    request.id,
                    SERVER_NOT_INITIALIZED,
                    "Server not initialized",
                ));
            } else {
                return None;
            }
        }

        match method {
            "ping" | "logging/setLevel" => {
                return Some(json_rpc_response(request.id, json!({})));
            }
            "resources/list" => {
                return Some(json_rpc_response(request.id, json!({ "resources": [] })));
            }
            "resources/templates/list" => {
                return Some(json_rpc_response(
                    request.id,
                    json!({ "resourceTemplates": [] }),
                ));
            }
            "resources/read" => {
                return Some(json_rpc_response(request.id, json!({ "contents": [] })));
            }
            "prompts/list" => {
                return Some(json_rpc_response(request.id, json!({ "prompts": [] })));
            }
            "prompts/get" => {
                return Some(json_rpc_error(request.id, INVALID_PARAMS, "Unknown prompt"));
            }
            "roots/list" => {
                return Some(json_rpc_response(request.id, json!({ "roots": [] })));
            }
            "tools/list" => {
                return Some(json_rpc_response(
                    request.id,
                    json!({ "tools": crate::tools::tool_definitions() }),
                ));
            }
            _ => {}
        }

        if method == "tools/call" {
            let Some(params_obj) = request.params.as_ref().and_then(Value::as_object) else {
                return Some(json_rpc_error(
                    request.id,
                    INVALID_PARAMS,
                    "params must be an object",
                ));
            };
            let tool_name = params_obj
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            // `"arguments": null` and a missing key both mean "no arguments".
            let args = match params_obj.get("arguments") {
                None | Some(Value::Null) => json!({}),
                Some(v) => v.clone(),
            };
            let reply = self.call_tool(tool_name, args);
            return Some(json_rpc_response(request.id, reply.to_result()));
        }

        if !expects_response {
            return None;
        }

        Some(json_rpc_error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {method}"),
        ))
    }

    pub(crate) fn call_tool(&mut self, name: &str, args: Value) -> ToolReply {
        let Some(reply) = crate::tools::dispatch_tool(self, name, args) else {
            log::warn!("unknown tool requested: {name}");
            return ToolReply {
                text: format!("Unknown tool: {name}"),
                is_error: true,
            };
        };
        if reply.is_error {
            log::warn!("tool {name} failed: {}", reply.text);
        } else {
            log::info!("tool {name}: {}", reply.text);
        }
        reply
    }
}
