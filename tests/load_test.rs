//! Load testing for the ROT13 API.

use std::time::{Duration, Instant};

use rot13_api::cipher::{rot13, validate};

mod common;

use common::{api_client, start_server, test_config};

#[tokio::test]
async fn test_concurrent_encoding() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    let server = start_server(config).await;

    let mut login = api_client(&server.url());
    let token = login
        .login("testuser", "testuser123")
        .await
        .unwrap()
        .access_token;

    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task in 0..concurrency {
        let client = api_client(&server.url()).with_token(token.clone());
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let letter = char::from(b'A' + ((task + i) % 26) as u8);
                let input = format!("{letter}{letter} HELLO {letter}");
                let expected = rot13(&validate(&input).unwrap()).into_inner();

                let req_start = Instant::now();
                let res = client.encode(&input).await.unwrap();
                latencies.push(req_start.elapsed());
                assert_eq!(res.result, expected);
            }
            latencies
        }));
    }

    let mut all_latencies: Vec<Duration> = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    assert_eq!(all_latencies.len(), total_requests);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!(
        "Requests/sec:   {:.2}",
        total_requests as f64 / duration.as_secs_f64()
    );
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");
}
