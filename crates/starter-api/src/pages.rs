//! # Pages
//!
//! Server-rendered HTML. Everything user-supplied goes through `html_escape`.

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute, encode_text};
use starter_core::User;

const STYLE: &str = "font-family: system-ui; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);";

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="{STYLE}">
    <div style="background: white; padding: 48px; border-radius: 16px; text-align: center; min-width: 320px;">
{body}
    </div>
</body>
</html>
"#,
        title = encode_text(title),
    ))
}

/// Which auth form to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    SignUp,
    Login,
}

impl AuthForm {
    fn title(self) -> &'static str {
        match self {
            AuthForm::SignUp => "Sign Up",
            AuthForm::Login => "Log In",
        }
    }

    fn action(self) -> &'static str {
        match self {
            AuthForm::SignUp => "/auth/signup",
            AuthForm::Login => "/auth/login",
        }
    }

    fn alternate(self) -> (&'static str, &'static str) {
        match self {
            AuthForm::SignUp => ("/auth/login", "Already have an account? Log in"),
            AuthForm::Login => ("/auth/signup", "Need an account? Sign up"),
        }
    }
}

pub fn home(user: Option<&User>) -> Html<String> {
    let body = match user {
        Some(user) => format!(
            r#"        <h1>Welcome back</h1>
        <p>Signed in as <strong>{}</strong></p>
        <p><a href="/dashboard">Dashboard</a> · <a href="/payment">Buy</a> · <a href="/auth/logout">Log out</a></p>"#,
            encode_text(user.display_email())
        ),
        None => r#"        <h1>SaaS Starter</h1>
        <p style="color: #666;">Auth and payments, ready to go.</p>
        <p><a href="/auth/signup">Sign up</a> · <a href="/auth/login">Log in</a></p>"#
            .to_string(),
    };
    layout("SaaS Starter", &body)
}

/// Sign-up or login form, optionally with an error and the email to refill
pub fn auth_form(form: AuthForm, error: Option<&str>, email: &str) -> Html<String> {
    let error = error
        .map(|message| {
            format!(
                r#"        <p role="alert" style="color: #c0392b;">{}</p>
"#,
                encode_text(message)
            )
        })
        .unwrap_or_default();
    let (alt_href, alt_label) = form.alternate();

    let body = format!(
        r#"        <h1>{title}</h1>
{error}        <form method="post" action="{action}" style="display: grid; gap: 12px;">
            <input type="email" name="email" placeholder="Email" value="{email}">
            <input type="password" name="password" placeholder="Password">
            <button type="submit">{title}</button>
        </form>
        <p><a href="{alt_href}">{alt_label}</a></p>"#,
        title = form.title(),
        action = form.action(),
        email = encode_double_quoted_attribute(email),
    );
    layout(form.title(), &body)
}

pub fn dashboard(user: &User) -> Html<String> {
    let body = format!(
        r#"        <h1>Dashboard</h1>
        <p>Email: <strong>{}</strong></p>
        <p>User ID: <code>{}</code></p>
        <p><a href="/payment">Make a payment</a> · <a href="/auth/logout">Log out</a></p>"#,
        encode_text(user.display_email()),
        encode_text(&user.id)
    );
    layout("Dashboard", &body)
}

/// Checkout page; the button posts to `/api/create-checkout` and follows the returned URL
pub fn payment(publishable_key: Option<&str>) -> Html<String> {
    let key_attr = publishable_key
        .map(|key| format!(r#" data-publishable-key="{}""#, encode_double_quoted_attribute(key)))
        .unwrap_or_default();

    let body = format!(
        r#"        <h1>Sample Product</h1>
        <p style="color: #666;">$10.00, one-time payment</p>
        <button id="checkout"{key_attr}>Checkout</button>
        <p id="checkout-error" role="alert" style="color: #c0392b;"></p>
        <script>
        document.getElementById("checkout").addEventListener("click", async () => {{
            const res = await fetch("/api/create-checkout", {{
                method: "POST",
                headers: {{ "Content-Type": "application/json" }},
                body: JSON.stringify({{ priceInCents: 1000, productName: "Sample Product" }})
            }});
            const data = await res.json();
            if (data.url) {{
                window.location.href = data.url;
            }} else {{
                document.getElementById("checkout-error").textContent = data.error || "Checkout failed";
            }}
        }});
        </script>"#
    );
    layout("Payment", &body)
}

pub fn success(session_id: Option<&str>) -> Html<String> {
    let session = session_id
        .map(|id| format!("        <p>Session: <code>{}</code></p>\n", encode_text(id)))
        .unwrap_or_default();

    let body = format!(
        r#"        <div style="font-size: 60px;">✅</div>
        <h1>Payment Successful!</h1>
{session}        <p style="color: #666;">Your payment was processed successfully.</p>
        <p><a href="/dashboard">Back to dashboard</a></p>"#
    );
    layout("Payment Successful", &body)
}

pub fn cancel() -> Html<String> {
    layout(
        "Payment Cancelled",
        r#"        <div style="font-size: 60px;">❌</div>
        <h1>Payment Cancelled</h1>
        <p style="color: #666;">No charges were made.</p>
        <p><a href="/payment">Try again</a></p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: Some("<ada>@example.com".to_string()),
            created_at: None,
            last_sign_in_at: None,
        }
    }

    #[test]
    fn test_dashboard_escapes_email() {
        let Html(page) = dashboard(&user());
        assert!(page.contains("&lt;ada&gt;@example.com"));
        assert!(!page.contains("<ada>"));
        assert!(page.contains("user-1"));
    }

    #[test]
    fn test_auth_form_shows_error_and_refills_email() {
        let Html(page) = auth_form(AuthForm::Login, Some("Invalid login credentials"), "a\"b@x.io");
        assert!(page.contains("Invalid login credentials"));
        assert!(page.contains(r#"action="/auth/login""#));
        assert!(page.contains("a&quot;b@x.io"));
    }

    #[test]
    fn test_home_links_depend_on_user() {
        let Html(anonymous) = home(None);
        assert!(anonymous.contains("/auth/signup"));

        let Html(signed_in) = home(Some(&user()));
        assert!(signed_in.contains("/auth/logout"));
    }
}
