//! Outgoing email via the provider's REST API (no SDK dependency)

use serde_json::json;

const SEND_URL: &str = "https://api.resend.com/emails";

async fn send(
    client: &reqwest::Client,
    api_key: &str,
    from: &str,
    to: &str,
    subject: &str,
    html: String,
) -> Result<(), reqwest::Error> {
    client
        .post(SEND_URL)
        .bearer_auth(api_key)
        .json(&json!({
            "from": from,
            "to": [to],
            "subject": subject,
            "html": html,
        }))
        .send()
        .await?
        .error_for_status()?;

    tracing::info!(to = to, subject = subject, "Email sent");
    Ok(())
}

pub async fn send_alert_email(
    client: &reqwest::Client,
    api_key: &str,
    from: &str,
    to: &str,
    alert_title: &str,
    alert_description: &str,
) -> Result<(), reqwest::Error> {
    let subject = format!("Alerta financeiro: {alert_title}");
    let html = format!(
        "<h2>{alert_title}</h2>\
         <p>{alert_description}</p>\
         <p>Acesse o painel para mais detalhes.</p>"
    );
    send(client, api_key, from, to, &subject, html).await
}

pub async fn send_test_email(
    client: &reqwest::Client,
    api_key: &str,
    from: &str,
    to: &str,
) -> Result<(), reqwest::Error> {
    let html = "<p>Este é um email de teste das suas notificações de alertas. \
         Se você recebeu esta mensagem, tudo está funcionando.</p>"
        .to_string();
    send(client, api_key, from, to, "Teste de notificações", html).await
}

pub async fn send_invite_email(
    client: &reqwest::Client,
    api_key: &str,
    from: &str,
    to: &str,
    owner_name: &str,
    token: &str,
) -> Result<(), reqwest::Error> {
    let html = format!(
        "<p>{owner_name} convidou você para acompanhar as finanças da família.</p>\
         <p><a href=\"https://app.centavo.app/invite/{token}\">Aceitar convite</a></p>\
         <p>O convite expira em 7 dias.</p>"
    );
    send(client, api_key, from, to, "Convite para o plano família", html).await
}
