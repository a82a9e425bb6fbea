//! libcurl-backed transport.

use std::cell::RefCell;
use std::time::Duration;

use curl::easy::Easy;

use super::head::HeaderBlock;
use super::{BodySink, Flow, GetRequest, ResponseHead, Transport, TransportError};

/// Why the write callback refused data.
#[derive(Debug, Clone, Copy)]
enum Halt {
    Status(u32),
    SinkStopped,
    Cancelled,
}

/// Transport issuing one libcurl easy handle per request.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
}

impl CurlTransport {
    /// `connect_timeout` bounds connection setup only, never the body read.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Transport for CurlTransport {
    fn get(
        &self,
        request: &GetRequest<'_>,
        sink: &mut dyn BodySink,
    ) -> Result<ResponseHead, TransportError> {
        let mut easy = Easy::new();
        easy.url(request.url).map_err(TransportError::Curl)?;
        easy.follow_location(true).map_err(TransportError::Curl)?;
        easy.max_redirections(10).map_err(TransportError::Curl)?;
        easy.connect_timeout(self.connect_timeout)
            .map_err(TransportError::Curl)?;
        if let Some(timeout) = request.timeout {
            easy.timeout(timeout).map_err(TransportError::Curl)?;
        }
        if let Some(range) = request.range {
            easy.range(&range.curl_spec()).map_err(TransportError::Curl)?;
        }
        // Enables the progress callback, used to notice cancellation while a read is stalled.
        easy.progress(true).map_err(TransportError::Curl)?;

        let headers = RefCell::new(HeaderBlock::default());
        let mut head_delivered = false;
        let mut halt: Option<Halt> = None;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|line| {
                    headers.borrow_mut().push_line(line);
                    true
                })
                .map_err(TransportError::Curl)?;
            transfer
                .write_function(|data| {
                    if request.is_cancelled() {
                        halt = Some(Halt::Cancelled);
                        return Ok(0);
                    }
                    if !head_delivered {
                        let head = headers.borrow().final_head().unwrap_or(ResponseHead {
                            status: 0,
                            content_length: None,
                        });
                        if !head.is_success() {
                            halt = Some(Halt::Status(head.status));
                            return Ok(0);
                        }
                        head_delivered = true;
                        if sink.head(&head) == Flow::Stop {
                            halt = Some(Halt::SinkStopped);
                            return Ok(0);
                        }
                    }
                    match sink.chunk(data) {
                        Flow::Continue => Ok(data.len()),
                        Flow::Stop => {
                            halt = Some(Halt::SinkStopped);
                            Ok(0)
                        }
                    }
                })
                .map_err(TransportError::Curl)?;
            transfer
                .progress_function(|_, _, _, _| !request.is_cancelled())
                .map_err(TransportError::Curl)?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            return Err(match halt {
                Some(Halt::Status(code)) => TransportError::Http(code),
                Some(Halt::SinkStopped) => TransportError::Stopped,
                Some(Halt::Cancelled) => TransportError::Cancelled,
                None if e.is_aborted_by_callback() => TransportError::Cancelled,
                None => TransportError::from_curl(e),
            });
        }

        let code = easy.response_code().map_err(TransportError::Curl)?;
        let mut head = headers.into_inner().final_head().unwrap_or(ResponseHead {
            status: code,
            content_length: None,
        });
        head.status = code;
        if !head.is_success() {
            return Err(TransportError::Http(code));
        }
        if !head_delivered && sink.head(&head) == Flow::Stop {
            return Err(TransportError::Stopped);
        }
        Ok(head)
    }
}
