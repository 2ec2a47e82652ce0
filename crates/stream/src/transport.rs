//! 스캔 전송 계층
//!
//! [`ScanTransport`]는 스캔 요청을 보내고 응답 본문을 바이트 청크 스트림으로
//! 돌려주는 trait입니다. 청크 경계는 줄 경계와 맞지 않을 수 있습니다.
//!
//! `ScanTransport`는 RPITIT를 사용하므로 `dyn ScanTransport`가 불가합니다.
//! 세션 컨트롤러는 [`DynScanTransport`]를 통해 전송 구현을 동적으로 보관합니다.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use adminscan_core::options::ScanOptions;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{Stream, TryStreamExt};
use reqwest::header::USER_AGENT;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ScanError;

/// 응답 본문 청크 스트림
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// 스캔 요청
///
/// 본문은 `{ "url": ..., "config": {...} }` 형태로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRequest {
    /// 스캔 대상 URL
    pub url: String,
    /// 요청 시점의 옵션 스냅샷 (스키마 순서)
    pub config: serde_json::Value,
    /// `User-Agent` 헤더 값
    #[serde(skip)]
    pub user_agent: String,
}

impl ScanRequest {
    /// 대상 URL과 현재 옵션으로 요청을 만듭니다.
    pub fn new(url: impl Into<String>, options: &ScanOptions) -> Self {
        Self {
            url: url.into(),
            config: options.to_json(),
            user_agent: options.user_agent().to_owned(),
        }
    }
}

/// 스캔 전송 trait
pub trait ScanTransport: Send + Sync {
    /// 요청을 보내고 성공 응답의 본문 스트림을 반환합니다.
    ///
    /// 응답 헤더를 받은 시점에 완료되어야 하며, 성공이 아닌 상태 코드는
    /// [`ScanError::HttpStatus`]로 실패합니다.
    fn open(&self, request: ScanRequest)
    -> impl Future<Output = Result<ByteStream, ScanError>> + Send;
}

/// dyn-compatible 전송 trait
pub trait DynScanTransport: Send + Sync {
    fn open(&self, request: ScanRequest) -> BoxFuture<'_, Result<ByteStream, ScanError>>;
}

/// ScanTransport를 구현한 타입은 자동으로 DynScanTransport도 구현됩니다.
impl<T: ScanTransport> DynScanTransport for T {
    fn open(&self, request: ScanRequest) -> BoxFuture<'_, Result<ByteStream, ScanError>> {
        Box::pin(ScanTransport::open(self, request))
    }
}

/// reqwest 기반 HTTP 전송
///
/// 연결 타임아웃만 적용합니다. 스캔 전체 시간은 제한하지 않으며 `timeout`
/// 옵션은 백엔드로 전달만 됩니다.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// 엔드포인트와 연결 타임아웃으로 전송을 생성합니다.
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 요청을 보낼 엔드포인트
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ScanTransport for HttpTransport {
    async fn open(&self, request: ScanRequest) -> Result<ByteStream, ScanError> {
        debug!(endpoint = %self.endpoint, target = %request.url, "sending scan request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, &request.user_agent)
            .json(&request)
            .send()
            .await
            .map_err(io::Error::other)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus(status.as_u16()));
        }
        info!(endpoint = %self.endpoint, status = status.as_u16(), "scan stream opened");

        Ok(Box::pin(response.bytes_stream().map_err(io::Error::other)))
    }
}
