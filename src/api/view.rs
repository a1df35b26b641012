// HTML rendering of a router snapshot

use std::fmt::Write;

use super::RouterView;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index(view: &RouterView) -> String {
    let snapshot = &view.snapshot;
    let name = escape(&snapshot.name);
    let mut html = String::new();

    // Writing to a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{name}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n\
         <h1>{name}</h1>\n<p>AS{}</p>\n",
        snapshot.bgp.local_as
    );

    html.push_str("<h2>Prefixes</h2>\n<ul>\n");
    for prefix in &snapshot.bgp.prefixes {
        let _ = writeln!(html, "<li>{}</li>", escape(prefix));
    }
    html.push_str("</ul>\n");

    html.push_str(
        "<h2>Peers</h2>\n<table>\n<tr><th>Name</th><th>Remote AS</th>\
         <th>Remote address</th><th>Address families</th></tr>\n",
    );
    for peer in &snapshot.bgp.peers {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&peer.name),
            escape(&peer.remote_as),
            escape(&peer.remote_address),
            escape(&peer.address_families)
        );
    }
    html.push_str("</table>\n");

    let _ = write!(
        html,
        "<footer>Collected {}</footer>\n</body>\n</html>\n",
        escape(&view.collected_at)
    );

    html
}
