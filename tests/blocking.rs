mod common;

use std::time::Duration;

use redlite::{commands::CommandError, resp::RespValue};

use crate::common::{array_of, simple, sleep_ms, TestEnv};

#[tokio::test]
async fn test_blpop_wakes_on_push() {
    let env = TestEnv::new();

    let client = env.spawn_blpop("q", "5");

    // Give the client time to park.
    sleep_ms(50).await;

    env.exec_ok(&["RPUSH", "q", "hello"], RespValue::Integer(1))
        .await;

    let result = common::wait_for_completion(client, Duration::from_secs(3)).await;
    assert_eq!(result, Ok(array_of(&["q", "hello"])));

    // The handed-off value never lands on the list.
    env.exec_ok(&["LLEN", "q"], RespValue::Integer(0)).await;
    env.exec_ok(&["LRANGE", "q", "0", "-1"], RespValue::Array(vec![]))
        .await;
}

#[tokio::test]
async fn test_blpop_returns_immediately_when_item_exists() {
    let env = TestEnv::new();

    env.exec_ok(&["RPUSH", "q", "ready"], RespValue::Integer(1))
        .await;

    env.exec_ok(&["BLPOP", "q", "1"], array_of(&["q", "ready"]))
        .await;
}

#[tokio::test]
async fn test_blpop_fifo_fairness() {
    let env = TestEnv::new();

    let first = env.spawn_blpop("q", "2");
    sleep_ms(100).await;
    let second = env.spawn_blpop("q", "2");
    sleep_ms(100).await;

    env.exec_ok(&["RPUSH", "q", "only"], RespValue::Integer(1))
        .await;

    let first_result = common::wait_for_completion(first, Duration::from_secs(3)).await;
    assert_eq!(
        first_result,
        Ok(array_of(&["q", "only"])),
        "the longest-waiting client receives the value"
    );

    let second_result = common::wait_for_completion(second, Duration::from_secs(3)).await;
    assert_eq!(second_result, Ok(RespValue::NullArray));
}

#[tokio::test]
async fn test_blpop_timeout_window() {
    let env = TestEnv::new();

    let start = std::time::Instant::now();
    env.exec_ok(&["BLPOP", "empty", "0.5"], RespValue::NullArray)
        .await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(450), "elapsed {:?}", elapsed);
    assert!(elapsed <= Duration::from_millis(700), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_blpop_zero_timeout_waits_indefinitely() {
    let env = TestEnv::new();

    let client = env.spawn_blpop("q", "0");

    sleep_ms(200).await;

    env.exec_ok(&["RPUSH", "q", "unblock"], RespValue::Integer(1))
        .await;

    let result = common::wait_for_completion(client, Duration::from_secs(1)).await;
    assert_eq!(result, Ok(array_of(&["q", "unblock"])));
}

#[tokio::test]
async fn test_blpop_multi_value_push_fans_out_in_fifo_order() {
    let env = TestEnv::new();

    let mut clients = Vec::new();

    for _ in 0..3 {
        clients.push(env.spawn_blpop("q", "5"));
        sleep_ms(50).await;
    }

    env.exec_ok(&["RPUSH", "q", "a", "b", "c"], RespValue::Integer(3))
        .await;

    let mut results = Vec::new();
    for client in clients {
        results.push(common::wait_for_completion(client, Duration::from_secs(2)).await);
    }

    assert_eq!(
        results,
        vec![
            Ok(array_of(&["q", "a"])),
            Ok(array_of(&["q", "b"])),
            Ok(array_of(&["q", "c"])),
        ]
    );

    env.exec_ok(&["LLEN", "q"], RespValue::Integer(0)).await;
}

#[tokio::test]
async fn test_blpop_single_item_goes_to_exactly_one_client() {
    let env = TestEnv::new();

    env.exec_ok(&["RPUSH", "q", "single"], RespValue::Integer(1))
        .await;

    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(env.spawn_blpop("q", "1"));
    }

    let mut results = Vec::new();
    for client in clients {
        results.push(common::wait_for_completion(client, Duration::from_secs(2)).await);
    }

    let winners = results
        .iter()
        .filter(|result| matches!(result, Ok(RespValue::Array(elements)) if !elements.is_empty()))
        .count();
    assert_eq!(winners, 1, "exactly one client should get the item");

    let timeouts = results
        .iter()
        .filter(|result| matches!(result, Ok(RespValue::NullArray)))
        .count();
    assert_eq!(timeouts, 2);
}

#[tokio::test]
async fn test_blpop_waiters_on_different_keys() {
    let env = TestEnv::new();

    let on_a = env.spawn_blpop("key_a", "3");
    let on_b = env.spawn_blpop("key_b", "3");

    sleep_ms(100).await;

    env.exec_ok(&["RPUSH", "key_b", "for-b"], RespValue::Integer(1))
        .await;
    env.exec_ok(&["RPUSH", "key_a", "for-a"], RespValue::Integer(1))
        .await;

    let result_a = common::wait_for_completion(on_a, Duration::from_secs(2)).await;
    assert_eq!(result_a, Ok(array_of(&["key_a", "for-a"])));

    let result_b = common::wait_for_completion(on_b, Duration::from_secs(2)).await;
    assert_eq!(result_b, Ok(array_of(&["key_b", "for-b"])));
}

#[tokio::test]
async fn test_blpop_argument_errors() {
    let env = TestEnv::new();

    env.exec_err(&["BLPOP", "q"], CommandError::WrongArity("BLPOP"))
        .await;
    env.exec_err(&["BLPOP", "q", "abc"], CommandError::InvalidTimeout)
        .await;
    env.exec_err(&["BLPOP", "q", "-1"], CommandError::InvalidTimeout)
        .await;
    env.exec_err(&["BLPOP", "q", "-0.5"], CommandError::InvalidTimeout)
        .await;
}

#[tokio::test]
async fn test_blpop_on_wrong_type() {
    let env = TestEnv::new();

    env.exec_ok(&["SET", "s", "v"], simple("OK")).await;
    env.exec_err(&["BLPOP", "s", "1"], CommandError::WrongType)
        .await;
}

#[tokio::test]
async fn test_flushdb_drains_blocked_clients() {
    let env = TestEnv::new();

    let client = env.spawn_blpop("q", "0");

    sleep_ms(100).await;

    env.exec_ok(&["FLUSHDB"], simple("OK")).await;

    let result = common::wait_for_completion(client, Duration::from_secs(1)).await;
    assert_eq!(result, Ok(RespValue::NullArray));
}

#[tokio::test]
async fn test_push_pop_conservation_under_concurrency() {
    let env = TestEnv::new();

    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(env.spawn_blpop("jobs", "3"));
        sleep_ms(20).await;
    }

    for value in ["j1", "j2"] {
        env.exec_ok(&["RPUSH", "jobs", value], RespValue::Integer(1))
            .await;
        sleep_ms(20).await;
    }
    env.exec_ok(&["RPUSH", "jobs", "j3", "j4"], RespValue::Integer(2))
        .await;

    let mut delivered = Vec::new();
    for client in clients {
        match common::wait_for_completion(client, Duration::from_secs(4)).await {
            Ok(RespValue::Array(elements)) => {
                delivered.push(elements[1].clone());
            }
            other => panic!("expected a delivery, got {:?}", other),
        }
    }

    // Every pushed value was delivered exactly once, none remain visible.
    let mut expected = vec![
        RespValue::BulkString("j1".into()),
        RespValue::BulkString("j2".into()),
        RespValue::BulkString("j3".into()),
        RespValue::BulkString("j4".into()),
    ];
    delivered.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
    expected.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
    assert_eq!(delivered, expected);

    env.exec_ok(&["LRANGE", "jobs", "0", "-1"], RespValue::Array(vec![]))
        .await;
}
