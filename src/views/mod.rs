//! Server-rendered pages. Each page module builds a complete HTML document
//! through [`layout`]; everything interpolated from users or upstream goes
//! through [`escape`].

pub mod auth;
pub mod dashboard;
pub mod home;
pub mod setup;

pub const BRAND: &str = "Researchable";

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f9fafb;color:#111827}\
header{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#fff;border-bottom:1px solid #e5e7eb}\
main{max-width:64rem;margin:0 auto;padding:2rem 1rem}\
.card{background:#fff;border:1px solid #e5e7eb;border-radius:.5rem;padding:1.5rem;margin-bottom:1.5rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(12rem,1fr));gap:1.5rem}\
.brand{font-size:1.5rem;font-weight:700}\
.error{color:#dc2626}.ok{color:#16a34a}\
button,.button{background:#2563eb;color:#fff;border:0;border-radius:.375rem;padding:.5rem 1rem;text-decoration:none;cursor:pointer}\
button[disabled]{opacity:.6;cursor:not-allowed}\
.outline{background:transparent;color:#2563eb;border:1px solid #2563eb}\
code,pre{background:#111827;color:#4ade80;border-radius:.25rem;padding:.1rem .4rem}\
label{display:block;margin:.75rem 0 .25rem}input,select{width:100%;padding:.5rem;box-sizing:border-box}";

/// Wrap a page body in the shared document shell. `title` is escaped here.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title} | {BRAND}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn brand_link() -> String {
    format!("<a class=\"brand\" href=\"/\">{BRAND}</a>")
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        "<header>{brand}</header>\n<main>\n<div class=\"card\">\n<h1>Something went wrong ({status})</h1>\n<p class=\"error\">{msg}</p>\n<p><a href=\"/\">Back to home</a></p>\n</div>\n</main>",
        brand = brand_link(),
        msg = escape(message),
    );
    layout("Error", &body)
}
