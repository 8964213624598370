//! Stub transports shared by the integration tests

use crawl_compare::crawler::{host_key, AsyncTransport, Attempt, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds an HTML page with the given title and number of links
pub fn page_html(title: &str, links: usize) -> String {
    let anchors: String = (0..links)
        .map(|i| format!("<a href=\"/link{}\">Link {}</a>", i, i))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    )
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

/// Deterministic transport answering from a fixed table
///
/// Unknown URLs fail to connect; URLs containing "panic" panic.
#[derive(Clone, Default)]
pub struct StubTransport {
    outcomes: HashMap<String, Attempt>,
    calls: Arc<AtomicUsize>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, title: &str, links: usize) -> Self {
        self.outcome(
            url,
            Attempt::Response {
                status_code: 200,
                body: page_html(title, links),
            },
        )
    }

    pub fn outcome(mut self, url: &str, attempt: Attempt) -> Self {
        self.outcomes.insert(url.to_string(), attempt);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str) -> Attempt {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("panic") {
            panic!("stub transport refused {}", url);
        }
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Attempt::ConnectionFailed("Connection refused".to_string()))
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &str, _timeout: Duration) -> Attempt {
        self.respond(url)
    }
}

impl AsyncTransport for StubTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Attempt {
        tokio::task::yield_now().await;
        self.respond(url)
    }
}

/// Async transport that records how many calls overlap, overall and per host
#[derive(Default)]
pub struct ConcurrencyRecorder {
    in_flight: Mutex<HashMap<String, usize>>,
    host_peaks: Mutex<HashMap<String, usize>>,
    global_in_flight: AtomicUsize,
    global_peak: AtomicUsize,
}

impl ConcurrencyRecorder {
    pub fn host_peak(&self, host: &str) -> usize {
        self.host_peaks
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .unwrap_or(0)
    }

    pub fn global_peak(&self) -> usize {
        self.global_peak.load(Ordering::SeqCst)
    }

    fn enter(&self, host: &str) {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let count = in_flight.entry(host.to_string()).or_insert(0);
            *count += 1;

            let mut peaks = self.host_peaks.lock().unwrap();
            let peak = peaks.entry(host.to_string()).or_insert(0);
            *peak = (*peak).max(*count);
        }

        let now = self.global_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.global_peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self, host: &str) {
        if let Some(count) = self.in_flight.lock().unwrap().get_mut(host) {
            *count -= 1;
        }
        self.global_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncTransport for ConcurrencyRecorder {
    async fn get(&self, url: &str, _timeout: Duration) -> Attempt {
        let host = host_key(url);
        self.enter(&host);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.leave(&host);

        Attempt::Response {
            status_code: 200,
            body: page_html("Recorded", 1),
        }
    }
}

/// Blocking transport that records how many calls overlap
#[derive(Default)]
pub struct BlockingRecorder {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl BlockingRecorder {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for BlockingRecorder {
    fn get(&self, _url: &str, _timeout: Duration) -> Attempt {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        std::thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Attempt::Response {
            status_code: 200,
            body: page_html("Recorded", 1),
        }
    }
}
