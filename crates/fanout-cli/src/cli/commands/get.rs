//! `fanout get <url>...` – fetch URLs concurrently through one batch.

use anyhow::{Context, Result};
use fanout_core::{Client, Request, RequestOptions, Response, TransferError};

pub fn run_get(client: &mut Client, urls: &[String]) -> Result<()> {
    let requests = urls
        .iter()
        .map(|u| Request::get(u).with_context(|| format!("bad URL {u}")))
        .collect::<Result<Vec<_>>>()?;

    println!("{:<7} {:<10} {}", "STATUS", "BYTES", "URL");
    for req in requests {
        client.send_async_request(req, RequestOptions::new().callback(print_row))?;
    }
    client.flush().context("batch finished with errors")?;
    Ok(())
}

fn print_row(req: &Request, outcome: Result<&Response, &TransferError>) {
    println!("{}", format_row(req, outcome));
}

/// One output line per completed transfer.
fn format_row(req: &Request, outcome: Result<&Response, &TransferError>) -> String {
    match outcome {
        Ok(resp) => format!("{:<7} {:<10} {}", resp.status(), resp.body().len(), req.url()),
        Err(err) => format!("{:<7} {:<10} {} ({})", "ERR", "-", req.url(), err.reason()),
    }
}
