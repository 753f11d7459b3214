use crate::cli::support::TestEnv;
use serde_json::{json, Value};
use tenex_core::keys::Keys;

/// Feed `requests` to `tenex-tools mcp` and parse every response line.
fn exchange(env: &TestEnv, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    exchange_raw(env, &input)
}

fn exchange_raw(env: &TestEnv, input: &str) -> Vec<Value> {
    let output = env
        .cmd()
        .arg("mcp")
        .write_stdin(input.to_string())
        .assert()
        .success()
        .get_output()
        .clone();

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| {
            serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("non-JSON line on MCP stdout: {:?} ({})", line, e))
        })
        .collect()
}

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

#[test]
fn test_mcp_handshake_and_tool_list() {
    let env = TestEnv::offline();
    let responses = exchange(
        &env,
        &[
            request(1, "initialize", json!({ "protocolVersion": "2024-11-05" })),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            request(2, "tools/list", json!({})),
        ],
    );

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "tenex-tools");

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"find_snippets"));
    assert!(names.contains(&"publish_code_snippet"));
    assert!(names.contains(&"get_agent"));
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[test]
fn test_mcp_commands_limits_tools() {
    let env = TestEnv::new();
    env.write_config("relays = [\"ws://127.0.0.1:1\"]\nmcp_commands = [\"users.list\"]\n");

    let responses = exchange(&env, &[request(1, "tools/list", json!({}))]);
    let tools = responses[0]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "list_usernames");
}

#[test]
fn test_mcp_errors() {
    let env = TestEnv::offline();
    let input = format!(
        "{}\nnot json at all\n\n{}\n",
        request(1, "resources/list", json!({})),
        request(2, "tools/call", json!({ "name": "no_such_tool" })),
    );
    let responses = exchange_raw(&env, &input);

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["error"]["code"], -32601);
    assert_eq!(responses[1]["error"]["code"], -32700);
    assert!(responses[1]["id"].is_null());
    assert_eq!(responses[2]["error"]["code"], -32602);
}

#[test]
fn test_mcp_offline_tools() {
    let env = TestEnv::offline();
    let responses = exchange(
        &env,
        &[
            request(1, "tools/call", json!({ "name": "list_usernames", "arguments": {} })),
            request(
                2,
                "tools/call",
                json!({ "name": "find_user", "arguments": { "query": "nobody" } }),
            ),
            request(
                3,
                "tools/call",
                json!({ "name": "publish", "arguments": { "content": "hello" } }),
            ),
        ],
    );

    assert_eq!(responses[0]["result"]["isError"], false);
    assert!(responses[0]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("No users found"));
    assert_eq!(
        responses[1]["result"]["content"][0]["text"],
        "No users found matching the query."
    );
    assert_eq!(responses[2]["result"]["isError"], true);
}

#[cfg(unix)]
#[test]
fn test_mcp_publish_review_keeps_stdout_clean() {
    let env = TestEnv::new();
    env.write_config(&format!(
        "relays = [\"ws://127.0.0.1:1\"]\nrelay_timeout_secs = 1\nprivate_key = \"{}\"\n\
         editor = \"sh -c 'echo EDITOR-NOISE'\"\nreview_snippets = true\n",
        Keys::generate().nsec().unwrap()
    ));

    let responses = exchange(
        &env,
        &[request(
            1,
            "tools/call",
            json!({
                "name": "publish_code_snippet",
                "arguments": {
                    "title": "Retry helper",
                    "description": "Retries a fallible closure",
                    "language": "rust",
                    "code": "fn retry() {}",
                    "tags": ["retry", "async", "rust", "errors", "helper"]
                }
            }),
        )],
    );

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 1);
    // The relay is unreachable, so the publish itself fails after review.
    assert_eq!(responses[0]["result"]["isError"], true);
}
