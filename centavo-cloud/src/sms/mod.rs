//! Verification SMS via the provider's REST API (no SDK dependency)

pub async fn send_verification_code(
    client: &reqwest::Client,
    account_sid: &str,
    auth_token: &str,
    from: &str,
    to: &str,
    code: &str,
) -> Result<(), reqwest::Error> {
    let body = format!("Seu código de verificação Centavo é: {code}. Válido por 30 minutos.");

    client
        .post(format!(
            "https://api.twilio.com/2010-04-01/Accounts/{account_sid}/Messages.json"
        ))
        .basic_auth(account_sid, Some(auth_token))
        .form(&[("To", to), ("From", from), ("Body", body.as_str())])
        .send()
        .await?
        .error_for_status()?;

    tracing::info!(to = to, "Verification SMS sent");
    Ok(())
}
