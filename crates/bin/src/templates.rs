//! HTML templates for web interface
//!
//! Simple inline HTML templates. Page chrome is escaped; the only place user
//! input is evaluated is the comment renderer in the library, before it
//! reaches these functions.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped when a username is placed in a URL path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"],
    textarea {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    textarea {
        font-family: monospace;
        resize: vertical;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #0052a3;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    .comment {
        margin: 10px 0;
        padding: 10px;
        background: #f9f9f9;
        border-left: 3px solid #0066cc;
        white-space: pre-wrap;
    }
    .result {
        margin: 15px 0;
        padding: 10px;
        background: #eef5ff;
        border-radius: 4px;
    }
    pre {
        background: #f5f5f5;
        padding: 10px;
        border-radius: 4px;
        overflow-x: auto;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
"#;

/// Posts the comment form as JSON and reloads on success
const COMMENT_SCRIPT: &str = r#"
    const form = document.getElementById("comment-form");
    form.addEventListener("submit", async (event) => {
        event.preventDefault();
        const text = document.getElementById("comment-text").value;
        const response = await fetch(form.dataset.action, {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify({ text }),
        });
        const data = await response.json();
        if (data.status === "ok") {
            location.reload();
        } else {
            alert(data.message || "Error");
        }
    });
"#;

/// Wrap a page body in the common document shell
fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        html_escape(title)
    )
}

/// Render the landing page of the combined app
pub fn landing_page() -> String {
    page(
        "CTF Multi-App",
        r#"        <h1>CTF Multi-App</h1>
        <ul>
            <li><a href="/ssrf">SSRF: URL fetcher</a></li>
            <li><a href="/ssti">SSTI: profiles and comments</a></li>
            <li><a href="/flags">Submit a flag</a></li>
        </ul>"#,
    )
}

/// Render the login page
pub fn login_page(base: &str, error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });

    page(
        "Login",
        &format!(
            r#"        <h1>Login</h1>
        {error_html}
        <form method="POST" action="{base}/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Login</button>
        </form>
        <p>Don't have an account? <a href="{base}/register">Register here</a></p>"#
        ),
    )
}

/// Render the registration page
pub fn register_page(base: &str) -> String {
    page(
        "Register",
        &format!(
            r#"        <h1>Register New Account</h1>
        <form method="POST" action="{base}/register">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Create Account</button>
        </form>
        <p>Already have an account? <a href="{base}/login">Login here</a></p>"#
        ),
    )
}

/// Everything the profile page shows
pub struct ProfileView {
    pub current_user: String,
    pub profile_username: String,
    /// Comments after template evaluation
    pub comments: Vec<String>,
    pub user_list: Vec<String>,
    pub can_comment: bool,
}

/// Render a user's profile page
pub fn profile_page(base: &str, view: &ProfileView) -> String {
    let comments_html = if view.comments.is_empty() {
        r#"<p style="color: #666; font-style: italic;">No comments yet.</p>"#.to_string()
    } else {
        view.comments
            .iter()
            .map(|c| format!(r#"<div class="comment">{}</div>"#, html_escape(c)))
            .collect::<Vec<_>>()
            .join("\n        ")
    };

    let users_html: String = view
        .user_list
        .iter()
        .map(|name| {
            format!(
                r#"<li><a href="{base}/user/{}">{}</a></li>"#,
                path_segment(name),
                html_escape(name)
            )
        })
        .collect();

    let form_html = if view.can_comment {
        format!(
            r#"<h2>Leave a comment</h2>
        <form id="comment-form" data-action="{base}/comment/{}">
            <div class="form-group">
                <textarea id="comment-text" rows="4" required></textarea>
            </div>
            <button type="submit">Post</button>
        </form>
        <script>{COMMENT_SCRIPT}</script>"#,
            path_segment(&view.profile_username)
        )
    } else {
        String::new()
    };

    page(
        &format!("{} - Profile", view.profile_username),
        &format!(
            r#"        <h1>Profile: {profile}
            <form method="POST" action="{base}/logout" style="display: inline;">
                <button type="submit" class="logout-btn">Logout</button>
            </form>
        </h1>
        <p>Logged in as <strong>{current}</strong></p>

        <h2>Comments</h2>
        {comments_html}

        {form_html}

        <h2>Users</h2>
        <ul>{users_html}</ul>"#,
            profile = html_escape(&view.profile_username),
            current = html_escape(&view.current_user),
        ),
    )
}

/// Render the flag submission page
pub fn flags_page(result: Option<&str>) -> String {
    let result_html = result.map_or(String::new(), |r| {
        format!(r#"<div class="result">{}</div>"#, html_escape(r))
    });

    page(
        "Submit a flag",
        &format!(
            r#"        <h1>Submit a flag</h1>
        {result_html}
        <form method="POST" action="/flags">
            <div class="form-group">
                <label for="flag">Flag:</label>
                <input type="text" id="flag" name="flag" required autofocus>
            </div>
            <button type="submit">Check</button>
        </form>
        <p><a href="/">Back</a></p>"#
        ),
    )
}

/// Render the URL fetcher form
pub fn ssrf_page() -> String {
    page(
        "URL Fetcher",
        r#"        <h1>URL Fetcher</h1>
        <p>Preview any page on the web.</p>
        <form method="POST" action="/ssrf/fetch">
            <div class="form-group">
                <label for="url">URL:</label>
                <input type="text" id="url" name="url" placeholder="https://example.com" required autofocus>
            </div>
            <button type="submit">Fetch</button>
        </form>"#,
    )
}

/// Render the fetched content
pub fn ssrf_result_page(url: &str, content: &str) -> String {
    page(
        "URL Fetcher - Result",
        &format!(
            r#"        <h1>Fetched: {}</h1>
        <pre>{}</pre>
        <p><a href="/ssrf">Fetch another</a></p>"#,
            html_escape(url),
            html_escape(content)
        ),
    )
}

/// Percent-encode a username for use as one URL path segment
pub fn path_segment(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
