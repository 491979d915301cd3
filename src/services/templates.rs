//! GDPR request templates.
//!
//! Three fixed templates, one per data-subject right. Rendering is a pure
//! function of the template and its fields: `{{placeholder}}` substitution
//! only, no conditionals. Missing optional fields render as empty strings;
//! only the company name and domain are required.

use serde::{Deserialize, Serialize};

use crate::domain::RequestType;

/// Error raised when required fields are absent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The company name or domain is missing.
    #[error("missing required template field {0}")]
    MissingField(&'static str),
}

/// Fields substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFields {
    /// Company display name. Required.
    pub company_name: String,
    /// Company domain. Required.
    pub company_domain: String,
    /// Requesting user's full name.
    pub user_name: String,
    /// Requesting user's email address.
    pub user_email: String,
}

/// A rendered request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRequest {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

const ACCESS_BODY: &str = "\
Dear {{company_name}} Data Protection Team,

I am writing to request access to the personal data you hold about me under
Article 15 of the General Data Protection Regulation (GDPR).

Please provide a copy of all personal data you process that relates to me,
together with the purposes of the processing, the categories of data
concerned, and the recipients to whom the data has been disclosed.

The email address associated with my account is {{user_email}}.

I look forward to your response within one month, as required by the GDPR.

Kind regards,
{{user_name}}";

const ERASE_BODY: &str = "\
Dear {{company_name}} Data Protection Team,

I am writing to request the erasure of my personal data under Article 17 of
the General Data Protection Regulation (GDPR), the right to be forgotten.

Please delete all personal data you hold that relates to me, and confirm in
writing once the erasure is complete. If any data must be retained under a
legal obligation, please state which data and the legal basis for retention.

The email address associated with my account is {{user_email}}.

I look forward to your confirmation within one month, as required by the GDPR.

Kind regards,
{{user_name}}";

const MODIFY_BODY: &str = "\
Dear {{company_name}} Data Protection Team,

I am writing to request the rectification of my personal data under Article
16 of the General Data Protection Regulation (GDPR).

Some of the personal data you hold about me is inaccurate or incomplete.
Please contact me at the address below so I can provide the corrected
details, and confirm once the rectification is complete.

The email address associated with my account is {{user_email}}.

I look forward to your response within one month, as required by the GDPR.

Kind regards,
{{user_name}}";

/// Renders the template for a request type.
///
/// Deterministic: identical input always yields identical output.
///
/// # Errors
///
/// Returns [`TemplateError::MissingField`] when the company name or domain
/// is empty; every other field substitutes as-is, empty or not.
pub fn render(
    request_type: RequestType,
    fields: &TemplateFields,
) -> Result<RenderedRequest, TemplateError> {
    if fields.company_name.trim().is_empty() {
        return Err(TemplateError::MissingField("company_name"));
    }
    if fields.company_domain.trim().is_empty() {
        return Err(TemplateError::MissingField("company_domain"));
    }

    let body = match request_type {
        RequestType::Access => ACCESS_BODY,
        RequestType::Erase => ERASE_BODY,
        RequestType::Modify => MODIFY_BODY,
    };

    let subject = format!(
        "{} under the GDPR - {}",
        request_type.display_name(),
        fields.company_name.trim()
    );

    Ok(RenderedRequest {
        subject,
        body: substitute(body, fields),
    })
}

/// Replaces `{{placeholder}}` tokens with field values.
fn substitute(template: &str, fields: &TemplateFields) -> String {
    template
        .replace("{{company_name}}", &fields.company_name)
        .replace("{{company_domain}}", &fields.company_domain)
        .replace("{{user_name}}", &fields.user_name)
        .replace("{{user_email}}", &fields.user_email)
}
