//! Build a configured Easy2 handle from a request and its resolved options.

use curl::easy::{Easy2, List};

use super::collector::ResponseCollector;
use crate::engine::TransferId;
use crate::options::TransferOptions;
use crate::request::{Method, Request};

/// Create an Easy2 handle for `request`: method and body, headers, timeouts,
/// redirect policy, user agent and TLS verification.
pub(super) fn build_easy(
    id: TransferId,
    request: &Request,
    options: &TransferOptions,
) -> Result<Easy2<ResponseCollector>, curl::Error> {
    let mut easy = Easy2::new(ResponseCollector::new(id));
    easy.url(request.url())?;

    let method = request.method();
    match method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Post => easy.post(true)?,
        other => easy.custom_request(other.as_str())?,
    }
    match request.body() {
        Some(body) if method != Method::Head => {
            easy.post(true)?;
            easy.post_fields_copy(body)?;
            // `post` switches the verb to POST; restore the requested one.
            if method != Method::Post {
                easy.custom_request(method.as_str())?;
            }
        }
        _ if method == Method::Post => easy.post_field_size(0)?,
        _ => {}
    }

    if !request.headers().is_empty() {
        let mut list = List::new();
        for (k, v) in request.headers() {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    easy.connect_timeout(options.connect_timeout)?;
    easy.timeout(options.timeout)?;
    easy.follow_location(options.follow_redirects)?;
    if options.follow_redirects {
        easy.max_redirections(options.max_redirects)?;
    }
    if let Some(ua) = &options.user_agent {
        easy.useragent(ua)?;
    }
    easy.ssl_verify_peer(options.verify_tls)?;
    easy.ssl_verify_host(options.verify_tls)?;
    Ok(easy)
}
