//! Rendering - HTML page, ledger fragment and Turbo Stream wrapping

use ledger_client::LedgerSummary;

/// DOM id of the live region replaced on every update
pub const LEDGER_TARGET: &str = "ledger";

/// WebSocket path the page subscribes to
pub const STREAM_PATH: &str = "/turbo-stream";

const TURBO_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/@hotwired/turbo@7.3.0/dist/turbo.es2017-umd.js";

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The live region showing one ledger summary
pub fn ledger_fragment(summary: &LedgerSummary) -> String {
    format!(
        r#"<div id="{target}">
  <dl>
    <dt>Close time</dt>
    <dd>{close_time}</dd>
    <dt>Ledger index</dt>
    <dd>{index}</dd>
    <dt>Ledger hash</dt>
    <dd><code>{hash}</code></dd>
    <dt>Transactions</dt>
    <dd>{tx_count}</dd>
  </dl>
</div>"#,
        target = LEDGER_TARGET,
        close_time = escape_html(&summary.close_time_human),
        index = summary.ledger_index,
        hash = escape_html(&summary.ledger_hash),
        tx_count = summary.tx_count,
    )
}

/// Wrap `html` as a Turbo Stream that replaces the element with id `target`
pub fn turbo_replace(target: &str, html: &str) -> String {
    format!(
        r#"<turbo-stream action="replace" target="{}"><template>{}</template></turbo-stream>"#,
        escape_html(target),
        html
    )
}

/// Full page with the live region and the stream subscription
pub fn index_page(summary: &LedgerSummary) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Latest Validated Ledger</title>
  <script src="{turbo}"></script>
  <script>
    (function connect() {{
      var scheme = location.protocol === "https:" ? "wss://" : "ws://";
      var socket = new WebSocket(scheme + location.host + "{stream}");
      Turbo.connectStreamSource(socket);
      socket.addEventListener("close", function () {{
        Turbo.disconnectStreamSource(socket);
        setTimeout(connect, 2000);
      }});
    }})();
  </script>
</head>
<body>
  <h1>Latest Validated Ledger</h1>
  {fragment}
</body>
</html>
"#,
        turbo = TURBO_SCRIPT_URL,
        stream = STREAM_PATH,
        fragment = ledger_fragment(summary),
    )
}
