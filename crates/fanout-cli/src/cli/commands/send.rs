//! `fanout send <url>` – send one request and print the response.

use anyhow::Result;
use fanout_core::{Client, Method, Request, RequestOptions, Response};
use std::io::{self, Write};

pub fn run_send(
    client: &mut Client,
    url: &str,
    method: &str,
    headers: &[String],
    data: Option<&str>,
    include: bool,
) -> Result<()> {
    let req = build_request(url, method, headers, data)?;
    let resp = client.send_request(req, RequestOptions::new())?;

    let mut out = io::stdout().lock();
    if include {
        write_head(&mut out, &resp)?;
    }
    out.write_all(resp.body())?;
    out.flush()?;
    Ok(())
}

fn build_request(url: &str, method: &str, headers: &[String], data: Option<&str>) -> Result<Request> {
    let method: Method = method.parse()?;
    let mut req = Request::new(method, url)?;
    for line in headers {
        req = req.with_header_line(line)?;
    }
    if let Some(body) = data {
        req = req.with_body(body);
    }
    Ok(req)
}

fn write_head(out: &mut impl Write, resp: &Response) -> io::Result<()> {
    writeln!(out, "{} {} {}", resp.version(), resp.status(), resp.reason())?;
    for (name, value) in resp.headers() {
        writeln!(out, "{}: {}", name, value)?;
    }
    writeln!(out)
}
