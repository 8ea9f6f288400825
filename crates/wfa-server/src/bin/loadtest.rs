//! Load-test harness: fires concurrent user flows at a running API and
//! reports latency percentiles, mirroring the trigger→poll flow from the
//! original Python/FastAPI regression suite (`benchmarks/regression_test.py`)
//! without the dual-service comparison — there is only one service here.
//!
//! Environment variables:
//!   API_URL     - default http://127.0.0.1:8000
//!   CONCURRENCY - default 50

use std::time::{Duration, Instant};

use serde_json::json;
use tokio::task::JoinSet;

const API_V1: &str = "/api/v1";

struct RequestMetric {
    endpoint: &'static str,
    status: u16,
    latency_ms: f64,
}

struct FlowMetrics {
    total: usize,
    successful: usize,
    failed: usize,
    latencies_ms: Vec<f64>,
    endpoint_latencies: std::collections::HashMap<&'static str, Vec<f64>>,
}

impl FlowMetrics {
    fn new() -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            latencies_ms: Vec::new(),
            endpoint_latencies: std::collections::HashMap::new(),
        }
    }

    fn record(&mut self, metric: RequestMetric) {
        self.total += 1;
        self.latencies_ms.push(metric.latency_ms);
        self.endpoint_latencies
            .entry(metric.endpoint)
            .or_default()
            .push(metric.latency_ms);
        if (200..300).contains(&metric.status) {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }

    fn merge(&mut self, other: FlowMetrics) {
        self.total += other.total;
        self.successful += other.successful;
        self.failed += other.failed;
        self.latencies_ms.extend(other.latencies_ms);
        for (ep, lats) in other.endpoint_latencies {
            self.endpoint_latencies.entry(ep).or_default().extend(lats);
        }
    }

    fn percentile(&self, p: f64) -> f64 {
        if self.latencies_ms.is_empty() {
            return 0.0;
        }
        let mut sorted = self.latencies_ms.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((sorted.len() as f64) * p / 100.0) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn mean(&self) -> f64 {
        if self.latencies_ms.is_empty() {
            return 0.0;
        }
        self.latencies_ms.iter().sum::<f64>() / self.latencies_ms.len() as f64
    }
}

async fn timed_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: String,
    endpoint: &'static str,
    body: Option<serde_json::Value>,
) -> (RequestMetric, Option<serde_json::Value>) {
    let start = Instant::now();
    let mut request = client.request(method, &url);
    if let Some(ref b) = body {
        request = request.json(b);
    }

    let (status, parsed) = match request.send().await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let parsed = resp.json::<serde_json::Value>().await.ok();
            (status, parsed)
        }
        Err(_) => (0, None),
    };

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    (
        RequestMetric {
            endpoint,
            status,
            latency_ms,
        },
        parsed,
    )
}

async fn single_user_flow(
    client: reqwest::Client,
    base_url: String,
    seed_workflow_id: String,
    user_idx: usize,
) -> FlowMetrics {
    let mut metrics = FlowMetrics::new();

    let (m, _) = timed_request(
        &client,
        reqwest::Method::GET,
        format!("{base_url}/health"),
        "/health",
        None,
    )
    .await;
    metrics.record(m);

    let trigger_payload = json!({
        "workflow_id": seed_workflow_id,
        "payload": {"user_id": format!("user_{user_idx}"), "event": "loadtest"},
    });
    let (m, parsed) = timed_request(
        &client,
        reqwest::Method::POST,
        format!("{base_url}{API_V1}/trigger"),
        "/api/v1/trigger",
        Some(trigger_payload),
    )
    .await;
    let run_id = parsed
        .as_ref()
        .and_then(|v| v.get("run_id"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    metrics.record(m);

    let (m, _) = timed_request(
        &client,
        reqwest::Method::GET,
        format!("{base_url}{API_V1}/runs/{run_id}"),
        "/api/v1/runs/{uuid}",
        None,
    )
    .await;
    metrics.record(m);

    let (m, _) = timed_request(
        &client,
        reqwest::Method::GET,
        format!("{base_url}{API_V1}/runs?limit=50"),
        "/api/v1/runs",
        None,
    )
    .await;
    metrics.record(m);

    metrics
}

async fn wait_for_service(client: &reqwest::Client, base_url: &str, timeout: Duration) -> bool {
    println!("waiting for {base_url}/health ...");
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                println!("  ready");
                return true;
            }
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    println!("  TIMEOUT: service did not become ready within {timeout:?}");
    false
}

#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let concurrency: usize = std::env::var("CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);

    println!("{}", "=".repeat(70));
    println!("  WORKFLOW AUTOMATION - LOAD TEST");
    println!("  concurrency: {concurrency}");
    println!("  target:      {base_url}");
    println!("{}", "=".repeat(70));

    let client = reqwest::Client::new();

    if !wait_for_service(&client, &base_url, Duration::from_secs(120)).await {
        eprintln!("aborting: service never became ready");
        std::process::exit(1);
    }

    let seed_workflow = json!({
        "id": "loadtest_workflow",
        "name": "Load Test Workflow",
        "description": "seed workflow for load testing",
        "steps": [
            {"name": "initial_delay", "type": "delay", "config": {"duration": 1}},
        ],
    });

    let seed_workflow_id = match client
        .post(format!("{base_url}{API_V1}/workflows"))
        .json(&seed_workflow)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("workflow_id").and_then(|v| v.as_str()).map(String::from))
            .unwrap_or_else(|| "loadtest_workflow".to_string()),
        _ => "loadtest_workflow".to_string(),
    };
    println!("  seed workflow id: {seed_workflow_id}\n");

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for i in 0..concurrency {
        let client = client.clone();
        let base_url = base_url.clone();
        let seed_workflow_id = seed_workflow_id.clone();
        tasks.spawn(single_user_flow(client, base_url, seed_workflow_id, i));
    }

    let mut metrics = FlowMetrics::new();
    while let Some(result) = tasks.join_next().await {
        if let Ok(flow) = result {
            metrics.merge(flow);
        }
    }
    let wall_time_s = start.elapsed().as_secs_f64();

    println!("{}", "=".repeat(70));
    println!("  RESULTS");
    println!("{}", "=".repeat(70));
    println!("  total requests:  {}", metrics.total);
    println!("  successful:      {}", metrics.successful);
    println!("  failed:          {}", metrics.failed);
    println!(
        "  error rate:      {:.2}%",
        if metrics.total == 0 {
            0.0
        } else {
            (metrics.failed as f64 / metrics.total as f64) * 100.0
        }
    );
    println!("  wall time:       {wall_time_s:.2}s");
    println!(
        "  throughput:      {:.1} req/s",
        if wall_time_s == 0.0 {
            0.0
        } else {
            metrics.total as f64 / wall_time_s
        }
    );
    println!("  mean latency:    {:.2}ms", metrics.mean());
    println!("  p50:             {:.2}ms", metrics.percentile(50.0));
    println!("  p95:             {:.2}ms", metrics.percentile(95.0));
    println!("  p99:             {:.2}ms", metrics.percentile(99.0));

    println!("\n  per-endpoint mean latency:");
    let mut endpoints: Vec<_> = metrics.endpoint_latencies.keys().collect();
    endpoints.sort();
    for ep in endpoints {
        let lats = &metrics.endpoint_latencies[ep];
        let mean = lats.iter().sum::<f64>() / lats.len() as f64;
        println!("    {ep:<30} {mean:.2}ms");
    }
}
