use nexus_agent::Agent;
use nexus_test_support::TestClient;
use serde_json::json;

#[tokio::test]
async fn a_non_2_0_envelope_with_a_recoverable_id_gets_a_final_error_response() {
    let agent = Agent::start_sample(0).await.unwrap();
    let mut client = TestClient::connect(agent.local_addr).await.unwrap();

    client
        .send_raw(json!({ "jsonrpc": "1.0", "id": 7, "method": "getApiVersionAsync", "params": [] }))
        .await;

    let response = client.read_envelope().await;
    assert_eq!(response["id"], json!(7));
    assert_eq!(response["error"]["code"], -1);

    assert!(client.expect_closed().await, "the session is fatal despite the final response");
    agent.shutdown().await;
}

#[tokio::test]
async fn a_non_2_0_envelope_without_an_id_just_closes() {
    let agent = Agent::start_sample(0).await.unwrap();
    let mut client = TestClient::connect(agent.local_addr).await.unwrap();

    client
        .send_raw(json!({ "jsonrpc": "1.0", "method": "getApiVersionAsync", "params": [] }))
        .await;

    assert!(client.expect_closed().await, "agent should drop the session");
    agent.shutdown().await;
}
