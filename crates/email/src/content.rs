//! Shared email content templates
//!
//! Canonical content generators for invitation emails, used by both
//! production (SES) and mock email services.

/// Registration link pre-filled with the invitee's address.
pub fn registration_url(app_base_url: &str, recipient_email: &str) -> String {
    format!(
        "{}/registration?email={}",
        app_base_url.trim_end_matches('/'),
        encode_query_value(recipient_email)
    )
}

// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// Generate plain-text body for a company invitation email.
pub fn company_invitation_text(
    sender_name: &str,
    company_name: &str,
    registration_url: &str,
) -> String {
    format!(
        "Hi there!\n\n\
        {} has invited you to join the company '{}' on Partyhub.\n\n\
        Click the link below to create your account:\n\
        {}\n\n\
        If you already have a Partyhub account, sign in and you will be added to the company.\n\n\
        Thanks,\n\
        The Partyhub Team",
        sender_name, company_name, registration_url
    )
}

/// Generate styled HTML body for a company invitation email.
pub fn company_invitation_html(
    sender_name: &str,
    company_name: &str,
    registration_url: &str,
) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2f6f4f;">You're invited to join {company_name}!</h2>

                    <p>Hi there!</p>

                    <p><strong>{sender_name}</strong> has invited you to join the company '<strong>{company_name}</strong>' on Partyhub.</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{registration_url}"
                           style="background-color: #2f6f4f; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block; font-weight: bold;">
                            Create Account
                        </a>
                    </div>

                    <p>Or copy and paste this link in your browser:</p>
                    <p style="background-color: #f5f5f5; padding: 10px; border-radius: 4px; word-break: break-all;">
                        <a href="{registration_url}">{registration_url}</a>
                    </p>

                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">

                    <p style="color: #666; font-size: 12px;">
                        If you already have a Partyhub account, sign in and you will be added to the company.<br>
                        Thanks, The Partyhub Team
                    </p>
                </div>
            </body>
            </html>
            "#,
        company_name = company_name,
        sender_name = sender_name,
        registration_url = registration_url
    )
}
