//! 호스트 식별자 정규화
//!
//! 전송 계층의 발신 주소(`a.b.c.d:port`, `[v6]:port`)에서 포트를 떼어내
//! 호스트 식별자를 만듭니다. 같은 호스트가 다른 소스 포트로 보내도
//! 하나의 식별자로 모입니다.

use std::net::SocketAddr;

/// 발신 주소 문자열에서 호스트 식별자를 구합니다.
///
/// 소켓 주소로 해석되면 IP 부분만, 아니면 입력을 그대로 반환합니다.
/// DNS 조회는 하지 않습니다.
pub fn resolve_host_identity(origin: &str) -> String {
    match origin.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => origin.to_owned(),
    }
}
