//! Scripted transport for unit tests: canned responses, simulated pacing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::save::ArtifactSink;
use crate::transport::{BodySink, ByteRange, Flow, GetRequest, ResponseHead, Transport, TransportError};

/// Clock that only moves when told to. Lets simulated transfers produce
/// exact, repeatable timings.
#[derive(Debug)]
pub(crate) struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    /// Time advanced since construction.
    pub(crate) fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
}

#[derive(Debug, Clone, Copy)]
enum Length {
    Actual,
    Omitted,
    Announced(u64),
}

#[derive(Debug, Clone)]
pub(crate) struct Route {
    status: u32,
    body_len: u64,
    length: Length,
    chunk_size: u64,
    per_chunk: Duration,
    honor_range: bool,
    unreachable: bool,
}

impl Route {
    pub(crate) fn body(len: u64) -> Self {
        Self {
            status: 200,
            body_len: len,
            length: Length::Actual,
            chunk_size: len.max(1),
            per_chunk: Duration::ZERO,
            honor_range: true,
            unreachable: false,
        }
    }

    pub(crate) fn status(code: u32) -> Self {
        Self {
            status: code,
            ..Self::body(0)
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::body(0)
        }
    }

    pub(crate) fn chunk(mut self, size: u64, per_chunk: Duration) -> Self {
        self.chunk_size = size.max(1);
        self.per_chunk = per_chunk;
        self
    }

    pub(crate) fn ignore_range(mut self) -> Self {
        self.honor_range = false;
        self
    }

    pub(crate) fn unknown_length(mut self) -> Self {
        self.length = Length::Omitted;
        self
    }

    /// Announce `len` in Content-Length; when larger than the body the
    /// stream ends early the way libcurl reports a partial file.
    pub(crate) fn announce(mut self, len: u64) -> Self {
        self.length = Length::Announced(len);
        self
    }
}

struct Call {
    url: String,
    range: Option<ByteRange>,
    timeout: Option<Duration>,
}

enum Pace {
    Manual(Arc<ManualClock>),
    Sleep,
}

pub(crate) struct ScriptedTransport {
    routes: HashMap<String, Route>,
    pace: Pace,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    /// Pacing advances `clock` instead of sleeping.
    pub(crate) fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            routes: HashMap::new(),
            pace: Pace::Manual(clock),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Pacing sleeps the calling thread, for tests that run probes in parallel.
    pub(crate) fn sleeping() -> Self {
        Self {
            routes: HashMap::new(),
            pace: Pace::Sleep,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.url.clone()).collect()
    }

    pub(crate) fn requested_ranges(&self) -> Vec<Option<ByteRange>> {
        self.calls.lock().unwrap().iter().map(|c| c.range).collect()
    }

    pub(crate) fn requested_timeouts(&self) -> Vec<Option<Duration>> {
        self.calls.lock().unwrap().iter().map(|c| c.timeout).collect()
    }

    fn wait(&self, d: Duration) {
        match &self.pace {
            Pace::Manual(clock) => clock.advance(d),
            Pace::Sleep => std::thread::sleep(d),
        }
    }
}

pub(crate) fn body_byte(offset: u64) -> u8 {
    (offset % 251) as u8
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        request: &GetRequest<'_>,
        sink: &mut dyn BodySink,
    ) -> Result<ResponseHead, TransportError> {
        self.calls.lock().unwrap().push(Call {
            url: request.url.to_string(),
            range: request.range,
            timeout: request.timeout,
        });

        let route = match self.routes.get(request.url) {
            Some(r) => r.clone(),
            None => return Err(TransportError::Curl(curl::Error::new(6))),
        };
        if route.unreachable {
            return Err(TransportError::Curl(curl::Error::new(7)));
        }
        if !(200..300).contains(&route.status) {
            return Err(TransportError::Http(route.status));
        }

        let (start, end, head) = match (request.range, route.honor_range) {
            (Some(range), true) => {
                let start = range.start.min(route.body_len);
                let end = (range.end_inclusive.saturating_add(1)).min(route.body_len);
                let head = ResponseHead {
                    status: 206,
                    content_length: Some(end - start),
                };
                (start, end, head)
            }
            _ => {
                let content_length = match route.length {
                    Length::Actual => Some(route.body_len),
                    Length::Omitted => None,
                    Length::Announced(n) => Some(n),
                };
                let head = ResponseHead {
                    status: route.status,
                    content_length,
                };
                (0, route.body_len, head)
            }
        };

        if sink.head(&head) == Flow::Stop {
            return Err(TransportError::Stopped);
        }

        let mut elapsed = Duration::ZERO;
        let mut offset = start;
        while offset < end {
            if request.is_cancelled() {
                return Err(TransportError::Cancelled);
            }
            self.wait(route.per_chunk);
            elapsed += route.per_chunk;
            if request.timeout.is_some_and(|t| elapsed > t) {
                return Err(TransportError::TimedOut);
            }
            let n = route.chunk_size.min(end - offset);
            let data: Vec<u8> = (offset..offset + n).map(body_byte).collect();
            offset += n;
            if sink.chunk(&data) == Flow::Stop {
                return Err(TransportError::Stopped);
            }
        }

        if let Some(announced) = head.content_length {
            if announced > end - start {
                return Err(TransportError::Curl(curl::Error::new(18)));
            }
        }
        Ok(head)
    }
}

/// Sink that keeps saved artifacts in memory.
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub(crate) saved: Vec<(String, Vec<u8>)>,
}

impl ArtifactSink for MemorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> std::io::Result<std::path::PathBuf> {
        self.saved.push((filename.to_string(), bytes.to_vec()));
        Ok(std::path::PathBuf::from(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - t0, Duration::from_millis(250));
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
    }
}
