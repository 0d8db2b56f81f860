//! Interactive documentation pages for the aggregated document.

use serde_json::{Map, Value};

const SWAGGER_UI_JS: &str = "https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js";
const SWAGGER_UI_CSS: &str = "https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css";
const REDOC_JS: &str = "https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js";

/// Swagger UI page loading the document from `openapi_url`.
///
/// `oauth2_redirect_url` enables the OAuth2 authorization flow; `init_oauth` is passed to
/// `ui.initOAuth` as-is.
pub fn swagger_ui_html(
    title: &str,
    openapi_url: &str,
    oauth2_redirect_url: Option<&str>,
    init_oauth: Option<&Map<String, Value>>,
) -> String {
    let title = escape_html(title);
    let openapi_url = js_literal(&Value::String(openapi_url.to_string()));
    let redirect = oauth2_redirect_url
        .map(|url| {
            let url = js_literal(&Value::String(url.to_string()));
            format!("\n    oauth2RedirectUrl: window.location.origin + {url},")
        })
        .unwrap_or_default();
    let init = init_oauth
        .map(|params| {
            let params = js_literal(&Value::Object(params.clone()));
            format!("\nui.initOAuth({params})")
        })
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<link type="text/css" rel="stylesheet" href="{SWAGGER_UI_CSS}">
<title>{title} - Swagger UI</title>
</head>
<body>
<div id="swagger-ui"></div>
<script src="{SWAGGER_UI_JS}"></script>
<script>
const ui = SwaggerUIBundle({{
    url: {openapi_url},
    dom_id: "#swagger-ui",
    layout: "BaseLayout",
    deepLinking: true,
    showExtensions: true,
    showCommonExtensions: true,{redirect}
    presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
}}){init}
</script>
</body>
</html>
"##
    )
}

/// ReDoc page loading the document from `openapi_url`.
pub fn redoc_html(title: &str, openapi_url: &str) -> String {
    let title = escape_html(title);
    let openapi_url = escape_html(openapi_url);
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>{title} - ReDoc</title>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>body {{ margin: 0; padding: 0; }}</style>
</head>
<body>
<redoc spec-url="{openapi_url}"></redoc>
<script src="{REDOC_JS}"></script>
</body>
</html>
"##
    )
}

/// Page Swagger UI's OAuth2 flow returns to; hands the result back to the opener.
pub const SWAGGER_UI_OAUTH2_REDIRECT_HTML: &str = r##"<!DOCTYPE html>
<html lang="en-US">
<head>
<title>Swagger UI: OAuth2 Redirect</title>
</head>
<body>
<script>
'use strict';
function run () {
    var oauth2 = window.opener.swaggerUIRedirectOauth2;
    var sentState = oauth2.state;
    var redirectUrl = oauth2.redirectUrl;
    var isValid, qp, arr;

    if (/code|token|error/.test(window.location.hash)) {
        qp = window.location.hash.substring(1).replace('?', '&');
    } else {
        qp = location.search.substring(1);
    }

    arr = qp.split("&");
    arr.forEach(function (v, i, _arr) { _arr[i] = '"' + v.replace('=', '":"') + '"'; });
    qp = qp ? JSON.parse('{' + arr.join() + '}',
            function (key, value) {
                return key === "" ? value : decodeURIComponent(value);
            }
    ) : {};

    isValid = qp.state === sentState;

    var flow = oauth2.auth.schema.get("flow");
    if ((flow === "accessCode" || flow === "authorizationCode" || flow === "authorization_code")
        && !oauth2.auth.code) {
        if (!isValid) {
            oauth2.errCb({
                authId: oauth2.auth.name,
                source: "auth",
                level: "warning",
                message: "Authorization may be unsafe, passed state was changed in server. The passed state wasn't returned from auth server."
            });
        }

        if (qp.code) {
            delete oauth2.state;
            oauth2.auth.code = qp.code;
            oauth2.callback({auth: oauth2.auth, redirectUrl: redirectUrl});
        } else {
            var oauthErrorMsg;
            if (qp.error) {
                oauthErrorMsg = "[" + qp.error + "]: " +
                    (qp.error_description ? qp.error_description + ". " : "no accessCode received from the server. ") +
                    (qp.error_uri ? "More info: " + qp.error_uri : "");
            }

            oauth2.errCb({
                authId: oauth2.auth.name,
                source: "auth",
                level: "error",
                message: oauthErrorMsg || "[Authorization failed]: no accessCode received from the server."
            });
        }
    } else {
        oauth2.callback({auth: oauth2.auth, token: qp, isValid: isValid, redirectUrl: redirectUrl});
    }
    window.close();
}

if (document.readyState !== 'loading') {
    run();
} else {
    document.addEventListener('DOMContentLoaded', function () {
        run();
    });
}
</script>
</body>
</html>
"##;

// Values placed in HTML text and attributes.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

// JSON is a valid JS expression; escaping `<` `>` `&` keeps `</script>` out of the page.
fn js_literal(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
